//! Request gates: steps that run before a handler and may end the request
//!
//! Gates are composed into a [`GateChain`] per route group. `SetCurrentUser`
//! always runs before `Authorize`.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::session::{self, CURRENT_USER_ID};
use crate::api::respond::found;
use crate::api::transaction::TxHandle;
use crate::error::{Error, Result};
use crate::models::User;

pub const LOGIN_PATH: &str = "/auth/new";

/// The signed-in user resolved for this request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub enum Flow {
    Continue(Request),
    Halt(Response),
}

#[async_trait]
pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, req: Request) -> Result<Flow>;
}

fn session_of(req: &Request) -> Result<Session> {
    req.extensions()
        .get::<Session>()
        .cloned()
        .ok_or(Error::MissingSession)
}

/// Resolves `current_user_id` to a user and attaches it to the request.
/// A session pointing at a user that no longer exists is cleared.
pub struct SetCurrentUser;

#[async_trait]
impl Gate for SetCurrentUser {
    fn name(&self) -> &'static str {
        "SetCurrentUser"
    }

    async fn handle(&self, mut req: Request) -> Result<Flow> {
        let session = session_of(&req)?;
        let Some(user_id) = session::current_user_id(&session).await? else {
            return Ok(Flow::Continue(req));
        };

        let user = match Uuid::parse_str(&user_id) {
            Ok(id) => {
                let handle = req
                    .extensions()
                    .get::<TxHandle>()
                    .cloned()
                    .ok_or(Error::MissingTransaction)?;
                let mut tx = handle.lock().await?;
                tx.find::<User>(id).await?
            }
            Err(_) => None,
        };

        match user {
            Some(user) => {
                req.extensions_mut().insert(CurrentUser(user));
                Ok(Flow::Continue(req))
            }
            None => {
                tracing::warn!(user_id = %user_id, "Session refers to an unknown user, clearing it");
                session.remove_value(CURRENT_USER_ID).await?;
                session::remember_request(&session, req.uri()).await?;
                session::flash(
                    &session,
                    "danger",
                    "You must be authorized with a correct user to see that page",
                )
                .await?;
                Ok(Flow::Halt(found(LOGIN_PATH)))
            }
        }
    }
}

/// Sends clients without a signed-in user to the login page
pub struct Authorize;

#[async_trait]
impl Gate for Authorize {
    fn name(&self) -> &'static str {
        "Authorize"
    }

    async fn handle(&self, req: Request) -> Result<Flow> {
        let session = session_of(&req)?;
        if session::current_user_id(&session).await?.is_some() {
            return Ok(Flow::Continue(req));
        }

        session::remember_request(&session, req.uri()).await?;
        session.save().await?;
        session::flash(&session, "danger", "You must be authorized to see that page").await?;
        tracing::debug!(path = %req.uri().path(), "Unauthenticated request redirected to login");
        Ok(Flow::Halt(found(LOGIN_PATH)))
    }
}

/// An ordered list of gates, fixed when the router is built
#[derive(Clone)]
pub struct GateChain {
    gates: Arc<[Arc<dyn Gate>]>,
}

impl GateChain {
    pub fn new(gates: Vec<Arc<dyn Gate>>) -> Self {
        Self {
            gates: gates.into(),
        }
    }

    /// Routes reachable without signing in
    pub fn public() -> Self {
        Self::new(vec![Arc::new(SetCurrentUser)])
    }

    pub fn protected() -> Self {
        Self::new(vec![Arc::new(SetCurrentUser), Arc::new(Authorize)])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|gate| gate.name()).collect()
    }

    pub async fn run(&self, mut req: Request) -> Result<Flow> {
        for gate in self.gates.iter() {
            match gate.handle(req).await? {
                Flow::Continue(next) => req = next,
                halt @ Flow::Halt(_) => return Ok(halt),
            }
        }
        Ok(Flow::Continue(req))
    }
}

/// Middleware entry point, installed with `from_fn_with_state`
pub async fn run_gates(State(chain): State<GateChain>, req: Request, next: Next) -> Response {
    match chain.run(req).await {
        Ok(Flow::Continue(req)) => next.run(req).await,
        Ok(Flow::Halt(response)) => response,
        Err(e) => e.into_response(),
    }
}
