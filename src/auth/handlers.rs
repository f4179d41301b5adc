//! Login, logout and self-registration

use axum::{extract::State, http::StatusCode, response::Response};
use minijinja::context;
use tower_sessions::Session;

use super::session::{self, CURRENT_USER_ID};
use crate::api::form::FormData;
use crate::api::respond::found;
use crate::api::server::SharedState;
use crate::api::transaction::TxHandle;
use crate::api::view::View;
use crate::auth::password;
use crate::error::Result;
use crate::models::{Errors, Op, User};
use crate::resources::{save, Resource, SaveContext};

/// `GET /` and `GET /auth`
pub async fn landing(view: View) -> Result<Response> {
    view.render("auth/landing.html", context! {}, StatusCode::OK).await
}

/// `GET /auth/new`
pub async fn new_session(view: View) -> Result<Response> {
    view.render(
        "auth/new.html",
        context! { email => "", errors => Errors::new().fields() },
        StatusCode::OK,
    )
    .await
}

/// `POST /auth`
pub async fn create_session(
    session: Session,
    tx: TxHandle,
    view: View,
    form: FormData,
) -> Result<Response> {
    let email = User::normalize_email(form.text("email").unwrap_or_default());
    let password = form.text("password").unwrap_or_default().to_string();

    let user = {
        let mut tx = tx.lock().await?;
        tx.find_by::<User>("email", &email).await?
    };
    let verified = match &user {
        Some(user) => password::verify(password, user.password_hash.clone()).await?,
        None => false,
    };
    let user = user.filter(|_| verified);

    let Some(user) = user else {
        let mut errors = Errors::new();
        errors.add("email", "invalid email/password");
        return view
            .render(
                "auth/new.html",
                context! { email => email, errors => errors.fields() },
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
    };

    session.cycle_id().await?;
    session.insert(CURRENT_USER_ID, user.id.to_string()).await?;
    session::flash(&session, "success", "Welcome Back!").await?;
    tracing::info!(user_id = %user.id, "User signed in");

    let target = session::take_redirect(&session)
        .await?
        .unwrap_or_else(|| "/".to_string());
    Ok(found(&target))
}

/// `DELETE /auth`
pub async fn destroy_session(session: Session) -> Result<Response> {
    session.remove_value(CURRENT_USER_ID).await?;
    session::flash(&session, "success", "You have been logged out!").await?;
    Ok(found("/"))
}

/// `GET /users/new`
pub async fn new_registration(view: View) -> Result<Response> {
    view.render(
        "users/new.html",
        context! { record => User::default(), errors => Errors::new().fields() },
        StatusCode::OK,
    )
    .await
}

/// `POST /users`: create an account and sign it in
pub async fn register(
    State(state): State<SharedState>,
    session: Session,
    tx: TxHandle,
    view: View,
    form: FormData,
) -> Result<Response> {
    let mut user = User::default();
    user.bind(&form)?;

    let ctx = SaveContext {
        op: Op::Create,
        form: &form,
        uploads: &state.uploads,
        auth: &state.config.auth,
    };
    let errors = {
        let mut tx = tx.lock().await?;
        save(&mut tx, &mut user, &ctx).await?
    };
    if errors.has_any() {
        return view
            .render(
                "users/new.html",
                context! { record => user, errors => errors.fields() },
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
    }

    session.cycle_id().await?;
    session.insert(CURRENT_USER_ID, user.id.to_string()).await?;
    session::flash(&session, "success", "Welcome to library!").await?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok(found("/"))
}
