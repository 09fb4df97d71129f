use thiserror::Error;

/// Errors produced by the API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An authenticated call was attempted with no token held.  No request
    /// is sent in this case.
    #[error("Not logged in")]
    Unauthenticated,

    /// Connectivity or transport failure before a response was received.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, or a 2xx body that could not be decoded.  Carries
    /// the server-provided message when one was present.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A configured base URL cannot have paths appended to it.
    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
