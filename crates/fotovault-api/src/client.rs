//! Concrete HTTP client for the album server.
//!
//! One [`ApiClient`] is constructed per process and handed to whoever needs
//! it; the bearer token lives behind a mutex so login can install it as a
//! side effect while other holders of the client keep using it.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::models::{
    Credentials, DeleteResponse, ErrorResponse, FileInfo, FileListResponse, LoginResponse,
    RegisterResponse, UploadResponse,
};
use crate::service::AlbumApi;

/// Per-request timeout.  The original client relied on transport defaults;
/// an explicit bound keeps stuck batches from hanging forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client holding the API base URL, the image base URL and the current
/// bearer token.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    image_base_url: Url,
    token: Mutex<Option<String>>,
}

impl ApiClient {
    /// Build a client against the given API and image base URLs.
    ///
    /// `base_url` is the REST root (e.g. `http://localhost:5001/api`);
    /// `image_base_url` is what relative preview paths resolve against
    /// (e.g. `http://localhost:5001`).
    pub fn new(base_url: Url, image_base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() || image_base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl("URL cannot be a base".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            image_base_url,
            token: Mutex::new(None),
        })
    }

    /// Install or clear the bearer token (e.g. from the persisted session at
    /// startup, or on logout).
    pub fn set_token(&self, token: Option<String>) {
        *self.token_guard() = token.filter(|t| !t.is_empty());
    }

    /// The token currently held, if any.
    pub fn token(&self) -> Option<String> {
        self.token_guard().clone()
    }

    /// Whether a token is currently held.
    pub fn has_token(&self) -> bool {
        self.token_guard().is_some()
    }

    fn token_guard(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned lock only means a panicked holder; the token itself is
        // still coherent.
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The held token, or [`ApiError::Unauthenticated`] without touching the
    /// network.
    fn bearer(&self) -> Result<String> {
        self.token_guard().clone().ok_or(ApiError::Unauthenticated)
    }

    /// Append one path segment to the API base URL.
    fn endpoint(&self, segment: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl("URL cannot be a base".into()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Like [`ApiClient::endpoint`] with a second segment, percent-escaping
    /// it (filenames may contain spaces or slashes).
    fn endpoint_with(&self, segment: &str, name: &str) -> Result<Url> {
        let mut url = self.endpoint(segment)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl("URL cannot be a base".into()))?
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl AlbumApi for ApiClient {
    async fn register(&self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint("register")?;
        debug!(%url, username, "registering");

        let response = self
            .http
            .post(url)
            .json(&Credentials { username, password })
            .send()
            .await?;

        let body: RegisterResponse = decode(response).await?;
        Ok(body.message)
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint("login")?;
        debug!(%url, username, "logging in");

        let response = self
            .http
            .post(url)
            .json(&Credentials { username, password })
            .send()
            .await?;

        let body: LoginResponse = decode(response).await?;

        // Keep the token for subsequent authenticated calls.
        self.set_token(Some(body.access_token));
        Ok(body.message)
    }

    async fn list_files(&self) -> Result<Vec<FileInfo>> {
        let token = self.bearer()?;
        let url = self.endpoint("files")?;
        debug!(%url, "fetching file list");

        let response = self.http.get(url).bearer_auth(token).send().await?;

        let body: FileListResponse = decode(response).await?;
        Ok(body.files)
    }

    async fn upload_file(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadResponse> {
        let token = self.bearer()?;
        let url = self.endpoint("upload")?;
        debug!(%url, filename, size = bytes.len(), "uploading file");

        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        decode(response).await
    }

    async fn delete_file(&self, filename: &str) -> Result<String> {
        let token = self.bearer()?;
        let url = self.endpoint_with("files", filename)?;
        debug!(%url, filename, "deleting file");

        let response = self.http.delete(url).bearer_auth(token).send().await?;

        let body: DeleteResponse = decode(response).await?;
        Ok(body.message)
    }

    fn preview_url(&self, file: &FileInfo) -> Result<Url> {
        let token = self.bearer()?;
        let mut url = self
            .image_base_url
            .join(&file.preview_url)
            .map_err(|e| ApiError::BaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }
}

/// Decode a response body, mapping non-2xx statuses and undecodable payloads
/// to [`ApiError::Server`] with the server message when one is present.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(&bytes)
            .map(|e| e.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Server {
        status: status.as_u16(),
        message: format!("malformed response: {e}"),
    })
}
