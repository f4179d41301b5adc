//! Response format selection

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT, request::Parts},
};
use std::collections::HashMap;
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
    Xml,
}

impl Format {
    /// `?format=` wins, then the Accept header, then HTML
    pub fn from_parts(parts: &Parts) -> Self {
        let explicit = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.get("format").and_then(|f| Self::from_name(f)));
        if let Some(format) = explicit {
            return format;
        }

        let accept = parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if accept.contains("text/html") {
            Format::Html
        } else if accept.contains("json") {
            Format::Json
        } else if accept.contains("xml") {
            Format::Xml
        } else {
            Format::Html
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "html" => Some(Format::Html),
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }
}

impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
