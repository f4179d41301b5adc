//! Files submitted through forms, written under `server.upload_dir`
//!
//! Stored files are referenced by their public path (`/uploads/...`), which
//! is what the `/uploads` route serves back.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;

pub const PUBLIC_PREFIX: &str = "/uploads";

/// One file part of a multipart body
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Browsers send an empty part when the file input was left blank
    pub fn is_present(&self) -> bool {
        !self.filename.trim().is_empty() && !self.bytes.is_empty()
    }

    /// Lower-cased extension including the dot, or empty
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `subdir/filename`, creating directories as needed,
    /// and return the public path
    pub async fn save(&self, subdir: Option<&str>, filename: &str, bytes: &[u8]) -> Result<String> {
        let dir = match subdir {
            Some(subdir) => self.root.join(subdir),
            None => self.root.clone(),
        };
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(filename), bytes).await?;

        let public = match subdir {
            Some(subdir) => format!("{}/{}/{}", PUBLIC_PREFIX, subdir, filename),
            None => format!("{}/{}", PUBLIC_PREFIX, filename),
        };
        tracing::debug!(path = %public, size = bytes.len(), "Stored upload");
        Ok(public)
    }

    /// Delete the file behind a public path. Already-missing files are fine.
    pub async fn remove(&self, public_path: &str) -> Result<()> {
        let Some(path) = self.resolve(public_path) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a public path back onto disk, refusing anything outside the root
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// Reduce a client-supplied filename to a safe single path component
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Book covers all share one name per extension; a new cover overwrites
/// any earlier cover with the same extension.
pub fn book_cover_filename(upload: &Upload) -> String {
    format!("{}{}", Uuid::NAMESPACE_DNS, upload.extension())
}
