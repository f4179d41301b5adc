//! HTTP server: application state, routing and middleware order

use axum::{
    extract::{DefaultBodyLimit, Query, Request},
    http::Method,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router, ServiceExt,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::{util::MapRequestLayer, Layer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;

use crate::auth::gates::{run_gates, GateChain};
use crate::auth::{handlers as auth, session};
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Book, Category, Customer, Inventory, User};
use crate::resources::resource_routes;
use crate::ui::{public_asset, Templates};
use crate::uploads::UploadStore;

use super::transaction::transaction_scope;

/// Application state shared across handlers, built once at start-up
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub templates: Templates,
    pub uploads: UploadStore,
    pub session_key: Key,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub async fn build(config: Config) -> Result<SharedState> {
        let db = Database::connect(&config.database).await?;
        db.migrate().await?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Database) -> SharedState {
        let uploads = UploadStore::new(config.server.upload_dir.clone());
        let session_key = session::signing_key(&config.session);
        Arc::new(Self {
            config,
            db,
            templates: Templates::new(),
            uploads,
            session_key,
        })
    }
}

/// Run the HTTP server until it fails
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::build(config).await?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve(listener: tokio::net::TcpListener, state: SharedState) -> Result<()> {
    let app = create_router(state);
    // The override must happen before routing so that `POST ...?_method=PUT`
    // reaches the PUT route.
    let app = MapRequestLayer::new(method_override).layer(app);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

/// HTML forms can only POST; `?_method=PUT|PATCH|DELETE` rewrites the method
fn method_override(mut req: Request) -> Request {
    if req.method() == Method::POST {
        let requested = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .ok()
            .and_then(|query| query.0.get("_method").map(|m| m.to_ascii_uppercase()));
        match requested.as_deref() {
            Some("PUT") => *req.method_mut() = Method::PUT,
            Some("PATCH") => *req.method_mut() = Method::PATCH,
            Some("DELETE") => *req.method_mut() = Method::DELETE,
            _ => {}
        }
    }
    req
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let public = Router::new()
        .route("/", get(auth::landing))
        .route("/auth", get(auth::landing).post(auth::create_session))
        .route("/auth/new", get(auth::new_session))
        .route("/users/new", get(auth::new_registration))
        .route("/users", post(auth::register))
        .route_layer(from_fn_with_state(GateChain::public(), run_gates));

    let protected = Router::new()
        .route("/auth", delete(auth::destroy_session))
        .merge(resource_routes::<Book>())
        .merge(resource_routes::<Category>())
        .merge(resource_routes::<Inventory>())
        .merge(resource_routes::<Customer>())
        .merge(resource_routes::<User>())
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .route_layer(from_fn_with_state(GateChain::protected(), run_gates));

    let sessions = session::session_layer(&state.config.session, state.session_key.clone());

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), transaction_scope))
        .fallback(public_asset)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
