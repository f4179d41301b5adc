//! Session keys, flash messages and the session layer

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, MemoryStore, Session, SessionManagerLayer,
};

use crate::config::SessionConfig;
use crate::error::Result;

pub const CURRENT_USER_ID: &str = "current_user_id";
pub const REDIRECT_URL: &str = "redirectURL";
const FLASH: &str = "_flash";

/// A one-shot notice shown on the next rendered page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: String,
    pub message: String,
}

pub async fn flash(session: &Session, kind: &str, message: &str) -> Result<()> {
    let mut messages: Vec<FlashMessage> = session.get(FLASH).await?.unwrap_or_default();
    messages.push(FlashMessage {
        kind: kind.to_string(),
        message: message.to_string(),
    });
    session.insert(FLASH, messages).await?;
    Ok(())
}

/// Remove and return the pending flash messages
pub async fn take_flashes(session: &Session) -> Result<Vec<FlashMessage>> {
    Ok(session.remove(FLASH).await?.unwrap_or_default())
}

pub async fn current_user_id(session: &Session) -> Result<Option<String>> {
    Ok(session.get(CURRENT_USER_ID).await?)
}

/// Store the URL a client asked for so login can send them back to it
pub async fn remember_request(session: &Session, uri: &Uri) -> Result<()> {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    session.insert(REDIRECT_URL, target).await?;
    Ok(())
}

/// The remembered URL, consumed. Only same-site paths are honoured.
pub async fn take_redirect(session: &Session) -> Result<Option<String>> {
    let target: Option<String> = session.remove(REDIRECT_URL).await?;
    Ok(target.filter(|t| t.starts_with('/') && !t.starts_with("//")))
}

/// Signing key from `session.secret`, or a random one for this process
pub fn signing_key(config: &SessionConfig) -> Key {
    if config.secret.is_empty() {
        tracing::warn!("session.secret is empty, generating a random key; sessions will not survive a restart");
        return Key::generate();
    }
    match Key::try_from(config.secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!("session.secret is shorter than 64 bytes, generating a random key");
            Key::generate()
        }
    }
}

pub fn session_layer(config: &SessionConfig, key: Key) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(config.cookie_name.clone())
        .with_secure(config.secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(config.inactivity_minutes)))
        .with_signed(key)
}
