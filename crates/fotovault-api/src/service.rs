//! Service contract for the album server.
//!
//! The workflow layer depends on this trait rather than on [`ApiClient`]
//! directly, so batch orchestration can be exercised against an in-memory
//! double in tests.
//!
//! [`ApiClient`]: crate::ApiClient

use async_trait::async_trait;
use reqwest::Url;

use crate::error::Result;
use crate::models::{FileInfo, UploadResponse};

/// The five remote operations plus preview resolution.
///
/// All calls are one request per invocation with no built-in retry.  The
/// authenticated operations fail with [`ApiError::Unauthenticated`] before
/// touching the network when no token is held.
///
/// [`ApiError::Unauthenticated`]: crate::ApiError::Unauthenticated
#[async_trait]
pub trait AlbumApi: Send + Sync {
    /// Create an account.  Returns the server message.
    async fn register(&self, username: &str, password: &str) -> Result<String>;

    /// Log in.  On success the implementation keeps the access token for
    /// subsequent calls and returns the server message.
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Fetch the full album listing.
    async fn list_files(&self) -> Result<Vec<FileInfo>>;

    /// Upload one JPEG-encoded image under `filename`.
    async fn upload_file(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadResponse>;

    /// Delete one stored file by name.  Returns the server message.
    async fn delete_file(&self, filename: &str) -> Result<String>;

    /// Resolve the absolute, token-carrying preview URL for a file.
    fn preview_url(&self, file: &FileInfo) -> Result<Url>;
}

// The binary shares one client between the controller and direct auth calls.
#[async_trait]
impl<S: AlbumApi + ?Sized> AlbumApi for std::sync::Arc<S> {
    async fn register(&self, username: &str, password: &str) -> Result<String> {
        (**self).register(username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        (**self).login(username, password).await
    }

    async fn list_files(&self) -> Result<Vec<FileInfo>> {
        (**self).list_files().await
    }

    async fn upload_file(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadResponse> {
        (**self).upload_file(bytes, filename).await
    }

    async fn delete_file(&self, filename: &str) -> Result<String> {
        (**self).delete_file(filename).await
    }

    fn preview_url(&self, file: &FileInfo) -> Result<Url> {
        (**self).preview_url(file)
    }
}
