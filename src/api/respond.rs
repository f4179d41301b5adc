//! Redirects and JSON/XML representations

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Errors;

/// 302, used by the gates and the login/logout flow
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// 303, used after a successful form submission
pub fn see_other(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    (status, Json(value)).into_response()
}

pub fn xml<T: Serialize>(status: StatusCode, root: &str, value: &T) -> Result<Response> {
    let body = quick_xml::se::to_string_with_root(root, value).map_err(|e| Error::Xml(e.to_string()))?;
    Ok(xml_body(status, body))
}

/// `<books><book>…</book>…</books>`
pub fn xml_list<T: Serialize>(status: StatusCode, plural: &str, singular: &str, items: &[T]) -> Result<Response> {
    let mut body = format!("<{}>", plural);
    for item in items {
        let element =
            quick_xml::se::to_string_with_root(singular, item).map_err(|e| Error::Xml(e.to_string()))?;
        body.push_str(&element);
    }
    body.push_str(&format!("</{}>", plural));
    Ok(xml_body(status, body))
}

pub fn validation_json(errors: &Errors) -> Response {
    json(StatusCode::UNPROCESSABLE_ENTITY, errors)
}

pub fn validation_xml(errors: &Errors) -> Result<Response> {
    xml(StatusCode::UNPROCESSABLE_ENTITY, "errors", errors.fields())
}

fn xml_body(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        body,
    )
        .into_response()
}
