//! # fotovault-client
//!
//! Workflow layer of the fotovault album client: the in-memory album state,
//! the selection-mode state machine, and the batch upload / batch delete
//! orchestration on top of [`fotovault_api::AlbumApi`].  The `fotovault`
//! binary in this crate wires it to the real HTTP client and the persisted
//! session store.

pub mod album;
pub mod config;
pub mod media;

pub use album::{AlbumController, BatchReport, PendingUpload};
pub use config::ClientConfig;
