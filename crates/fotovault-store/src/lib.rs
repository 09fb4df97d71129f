//! # fotovault-store
//!
//! Local persistent state for the fotovault client, backed by SQLite.
//!
//! The only thing stored today is the login session: the bearer token and the
//! instant it was issued.  The crate exposes a synchronous [`Database`] handle
//! that wraps a `rusqlite::Connection` and provides typed helpers on top.

pub mod database;
pub mod migrations;
pub mod session;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use session::{Session, SESSION_LIFETIME_DAYS};
