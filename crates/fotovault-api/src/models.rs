//! Wire models for the album server.
//!
//! Field names match the server JSON verbatim (`access_token`, `upload_time`,
//! `preview_url`), so no serde renames are needed.

use serde::{Deserialize, Serialize};

/// Immutable snapshot of one server-held photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload instant as epoch seconds.
    pub upload_time: f64,
    /// Server-relative preview path, resolved against the image base URL.
    pub preview_url: String,
}

impl FileInfo {
    /// Last path segment of the preview URL.
    ///
    /// Delete requests target this name rather than `filename`, matching the
    /// server's addressing of stored assets.
    pub fn preview_filename(&self) -> &str {
        self.preview_url
            .rsplit('/')
            .next()
            .unwrap_or(self.preview_url.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub message: String,
}

/// Response to a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub preview_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListResponse {
    pub files: Vec<FileInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteResponse {
    pub message: String,
    #[allow(dead_code)]
    pub filename: String,
}

/// Error payload the server attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}
