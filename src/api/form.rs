//! Request body binding
//!
//! Urlencoded forms, multipart forms and JSON objects all bind to the same
//! flat field map, so a resource binds one way regardless of how the client
//! encoded the body.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::uploads::Upload;

#[derive(Debug, Default, Clone)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, name: &str, upload: Upload) -> Self {
        self.files.insert(name.to_string(), upload);
        self
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Overwrite `target` only when the field was submitted
    pub fn bind_text(&self, name: &str, target: &mut String) {
        if let Some(value) = self.text(name) {
            *target = value.to_string();
        }
    }

    pub fn bind_int(&self, name: &str, target: &mut i32) -> Result<()> {
        if let Some(value) = self.int(name)? {
            *target = value;
        }
        Ok(())
    }

    /// Missing or blank is `None`; anything else must parse
    pub fn int(&self, name: &str) -> Result<Option<i32>> {
        match self.text(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| Error::BadRequest(format!("{} must be a whole number", name))),
        }
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<serde_json::Value>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            from_json(value)
        } else if content_type.is_empty() {
            Ok(Self::default())
        } else {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            Ok(Self::from_pairs(pairs))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormData> {
    let mut data = FormData::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
                data.files.insert(
                    name,
                    Upload {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
                data.fields.insert(name, text);
            }
        }
    }
    Ok(data)
}

fn from_json(value: serde_json::Value) -> Result<FormData> {
    let serde_json::Value::Object(map) = value else {
        return Err(Error::BadRequest("expected a JSON object".to_string()));
    };
    let fields = map.into_iter().filter_map(|(key, value)| {
        let text = match value {
            serde_json::Value::Null => return None,
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Some((key, text))
    });
    Ok(FormData::from_pairs(fields))
}
