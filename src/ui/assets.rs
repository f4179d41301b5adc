//! Embedded public assets, served as the router fallback

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "public/"]
struct PublicFiles;

pub async fn public_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    match PublicFiles::get(path) {
        Some(file) if !path.is_empty() => (
            [(header::CONTENT_TYPE, file.metadata.mimetype().to_string())],
            file.data.into_owned(),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "Page not found").into_response(),
    }
}
