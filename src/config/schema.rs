//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory uploaded book covers and profile photos are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest request body accepted, multipart uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_upload_bytes() -> usize {
    32 << 20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Which storage engine backs the credential and resource tables
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// Process-local tables, lost on exit
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,

    /// libpq-style connection string
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "host=localhost port=5432 user=postgres password=postgres dbname=library_development"
        .to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Signing secret, at least 64 bytes. A random key is generated when empty,
    /// which invalidates every session on restart.
    #[serde(default)]
    pub secret: String,

    /// Only send the cookie over HTTPS
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_minutes: i64,
}

fn default_cookie_name() -> String {
    "_library_session".to_string()
}

fn default_inactivity_minutes() -> i64 {
    120
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secret: String::new(),
            secure: false,
            inactivity_minutes: default_inactivity_minutes(),
        }
    }
}

/// Password handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Re-hash the submitted password on every user update, even when it is
    /// empty. Off by default: the hash is only replaced when a new password is
    /// supplied.
    #[serde(default)]
    pub always_rehash_password: bool,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
            always_rehash_password: false,
        }
    }
}

/// List window defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

impl Config {
    /// Configuration backed by the in-memory database, used for development
    /// and tests
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.backend = DatabaseBackend::Memory;
        config
    }

    /// Reject values serde accepts but the server cannot run with
    pub fn check(&self) -> Result<()> {
        if self.pagination.per_page == 0 {
            return Err(Error::Config("pagination.per_page must be at least 1".into()));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config("server.max_upload_bytes must be at least 1".into()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config("database.max_connections must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(config.session.cookie_name, "_library_session");
        assert_eq!(config.pagination.per_page, 20);
        assert!(!config.auth.always_rehash_password);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[database]
backend = "memory"

[auth]
bcrypt_cost = 4
"#,
        )
        .unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.bcrypt_cost, 4);
    }

    #[test]
    fn test_check_bcrypt_cost_range() {
        let mut config = Config::default();
        assert!(config.check().is_ok());
        config.auth.bcrypt_cost = 3;
        assert!(config.check().is_err());
        config.auth.bcrypt_cost = 31;
        assert!(config.check().is_ok());
    }
}
