//! # fotovault-api
//!
//! Typed HTTP client for the fotovault album server.
//!
//! The server speaks plain JSON over five endpoints (register, login, list,
//! upload, delete); everything past login requires a bearer token.  The
//! concrete client is [`ApiClient`]; the operations are also exposed through
//! the [`AlbumApi`] trait so workflow code can be tested against an in-memory
//! double.

pub mod client;
pub mod models;
pub mod service;

mod error;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use models::{FileInfo, UploadResponse};
pub use service::AlbumApi;

// Callers name URLs in our signatures; save them the extra dependency.
pub use reqwest::Url;
