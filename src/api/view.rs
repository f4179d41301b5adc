//! HTML rendering with the layout's per-request context

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Value};
use tower_sessions::Session;

use super::server::SharedState;
use crate::auth::gates::CurrentUser;
use crate::auth::session;
use crate::error::{Error, Result};
use crate::models::User;

/// Everything a page render needs besides its own context: the session for
/// flashes and the signed-in user for the layout.
pub struct View {
    session: Session,
    current_user: Option<User>,
    state: SharedState,
}

impl FromRequestParts<SharedState> for View {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(Error::MissingSession)?;
        let current_user = parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| current.0.clone());
        Ok(Self {
            session,
            current_user,
            state: state.clone(),
        })
    }
}

impl View {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn flash(&self, kind: &str, message: &str) -> Result<()> {
        session::flash(&self.session, kind, message).await
    }

    /// Render `template` inside the layout. Pending flashes are consumed.
    pub async fn render(&self, template: &str, ctx: Value, status: StatusCode) -> Result<Response> {
        let flashes = session::take_flashes(&self.session).await?;
        let html = self.state.templates.render(
            template,
            context! {
                current_user => &self.current_user,
                flashes => flashes,
                ..ctx
            },
        )?;
        Ok((status, Html(html)).into_response())
    }
}
