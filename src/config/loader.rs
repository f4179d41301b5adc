//! Reading `library.toml`
//!
//! The file is taken from `LIBRARY_CONFIG` when that is set, otherwise it is
//! searched for from the working directory upward. `${VAR}` and
//! `${VAR:-default}` references are expanded from the environment before the
//! TOML is parsed.

use regex::{Captures, Regex};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::Config;
use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = "library.toml";
pub const CONFIG_ENV: &str = "LIBRARY_CONFIG";

static ENV_REFERENCE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}"));

pub fn load_config() -> Result<Config> {
    let path = match env::var_os(CONFIG_ENV) {
        Some(path) => PathBuf::from(path),
        None => {
            let cwd = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;
            locate(&cwd).ok_or(Error::ConfigNotFound)?
        }
    };
    tracing::debug!(path = %path.display(), "Loading configuration");
    load_config_from_path(&path)
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let expanded = expand_env(&raw, |name| env::var(name).ok())?;
    let config: Config = toml::from_str(&expanded)?;
    config.check()?;
    Ok(config)
}

/// Nearest `library.toml` at or above `start`
fn locate(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

fn expand_env(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let pattern = ENV_REFERENCE
        .as_ref()
        .map_err(|e| Error::Config(e.to_string()))?;
    let expanded = pattern.replace_all(content, |caps: &Captures| {
        lookup(&caps[1]).unwrap_or_else(|| {
            caps.get(2)
                .map(|fallback| fallback.as_str().to_string())
                .unwrap_or_default()
        })
    });
    Ok(expanded.into_owned())
}

/// Contents written by `library init`
pub fn default_config_content() -> &'static str {
    r#"# Library Configuration

[server]
host = "0.0.0.0"
port = 3000
upload_dir = "./uploads"
max_upload_bytes = 33554432  # 32 MiB

[database]
backend = "postgres"  # or "memory" for a throwaway development database
url = "${DATABASE_URL:-host=localhost port=5432 user=postgres password=postgres dbname=library_development}"
max_connections = 10

[session]
cookie_name = "_library_session"
# At least 64 bytes. Leave empty to generate a key on every start.
secret = "${SESSION_SECRET:-}"
secure = false
inactivity_minutes = 120

[auth]
bcrypt_cost = 12
# Re-hash the password field on every user update, even when left blank
always_rehash_password = false

[pagination]
per_page = 20
"#
}
