//! Per-request database transaction
//!
//! `transaction_scope` opens a transaction before any gate runs and publishes
//! it in the request extensions as a [`TxHandle`]. When the rest of the chain
//! finishes the transaction is committed for statuses below 400 and rolled
//! back otherwise. A panic inside the chain rolls back and becomes a 500.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};

use super::server::SharedState;
use crate::db::Tx;
use crate::error::{Error, Result};

/// Shared access to the request's open transaction
#[derive(Clone)]
pub struct TxHandle(Arc<Mutex<Option<Tx>>>);

pub type TxGuard = OwnedMappedMutexGuard<Option<Tx>, Tx>;

impl TxHandle {
    pub fn new(tx: Tx) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    /// Exclusive use of the transaction until the guard is dropped
    pub async fn lock(&self) -> Result<TxGuard> {
        let guard = Arc::clone(&self.0).lock_owned().await;
        OwnedMutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| Error::MissingTransaction)
    }

    async fn take(&self) -> Option<Tx> {
        self.0.lock().await.take()
    }
}

impl<S> FromRequestParts<S> for TxHandle
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<TxHandle>()
            .cloned()
            .ok_or(Error::MissingTransaction)
    }
}

pub async fn transaction_scope(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let tx = match state.db.begin().await {
        Ok(tx) => tx,
        Err(e) => return e.into_response(),
    };
    let handle = TxHandle::new(tx);
    req.extensions_mut().insert(handle.clone());

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let outcome = AssertUnwindSafe(next.run(req)).catch_unwind().await;

    let Some(tx) = handle.take().await else {
        return Error::MissingTransaction.into_response();
    };

    match outcome {
        Ok(response) if response.status().as_u16() < 400 => match tx.commit().await {
            Ok(()) => {
                tracing::debug!(%method, %path, status = %response.status(), "Committed transaction");
                response
            }
            Err(e) => e.into_response(),
        },
        Ok(response) => {
            if let Err(e) = tx.rollback().await {
                tracing::error!(error = %e, "Rollback failed");
            }
            tracing::debug!(%method, %path, status = %response.status(), "Rolled back transaction");
            response
        }
        Err(_) => {
            if let Err(e) = tx.rollback().await {
                tracing::error!(error = %e, "Rollback failed");
            }
            tracing::error!(%method, %path, "Handler panicked, transaction rolled back");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again later.",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDatabase;
    use crate::models::Category;

    #[tokio::test]
    async fn test_lock_gives_access_to_the_transaction() {
        let db = crate::db::Database::Memory(MemoryDatabase::new());
        let handle = TxHandle::new(db.begin().await.unwrap());
        {
            let mut tx = handle.lock().await.unwrap();
            let mut category = Category {
                category_name: "Art".to_string(),
                status: 1,
                ..Default::default()
            };
            tx.create(&mut category).await.unwrap();
        }
        let mut tx = handle.lock().await.unwrap();
        assert_eq!(tx.count::<Category>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lock_after_close_is_missing_transaction() {
        let db = crate::db::Database::Memory(MemoryDatabase::new());
        let handle = TxHandle::new(db.begin().await.unwrap());
        handle.take().await.unwrap().commit().await.unwrap();
        assert!(matches!(
            handle.lock().await,
            Err(Error::MissingTransaction)
        ));
    }

    #[tokio::test]
    async fn test_missing_handle_is_rejected() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let result = TxHandle::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(Error::MissingTransaction)));
    }
}
