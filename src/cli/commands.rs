//! CLI command implementations

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Password};
use std::fs;

use crate::api::form::FormData;
use crate::cli::{info, print_errors, print_user_table, success, warn, OutputFormat};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::db::Database;
use crate::models::{Op, User};
use crate::resources::{save, Resource, SaveContext};
use crate::uploads::UploadStore;

/// Initialize a new library.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set database.url and session.secret, then run 'library migrate' and 'library users create --email <email>'");

    Ok(())
}

/// Start the web server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Create missing tables
pub async fn migrate() -> Result<()> {
    let config = load_config()?;
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    success("Database schema is up to date");
    Ok(())
}

/// Create a user from the terminal
pub async fn create_user(email: &str, name: Option<String>) -> Result<()> {
    let config = load_config()?;
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let form = FormData::from_pairs([
        ("email", email.to_string()),
        ("name", name.unwrap_or_default()),
        ("password", password.clone()),
        ("password_confirmation", password),
    ]);
    let mut user = User::default();
    user.bind(&form)?;

    let uploads = UploadStore::new(config.server.upload_dir.clone());
    let ctx = SaveContext {
        op: Op::Create,
        form: &form,
        uploads: &uploads,
        auth: &config.auth,
    };

    let mut tx = db.begin().await?;
    let errors = save(&mut tx, &mut user, &ctx).await?;
    if errors.has_any() {
        tx.rollback().await?;
        print_errors(&errors);
        bail!("User was not created");
    }
    tx.commit().await?;

    success(&format!("Created user {} ({})", user.email, user.id));
    Ok(())
}

/// List users
pub async fn list_users(format: OutputFormat) -> Result<()> {
    let config = load_config()?;
    let db = Database::connect(&config.database).await?;

    let mut tx = db.begin().await?;
    let users: Vec<User> = tx.all().await?;
    tx.commit().await?;

    match format {
        OutputFormat::Table => print_user_table(&users),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
    }

    Ok(())
}

// Helper functions

fn load_config() -> Result<Config> {
    config::load_config().map_err(|e| anyhow::anyhow!("{}", e))
}
