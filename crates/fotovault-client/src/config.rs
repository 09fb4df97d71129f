//! Client configuration loaded from environment variables.
//!
//! All settings have defaults pointing at a local development server, so the
//! client runs with zero configuration against `localhost`.

use std::path::PathBuf;

/// Default REST root of the album server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5001/api";

/// Default base URL that relative preview paths resolve against.
pub const DEFAULT_IMAGE_URL: &str = "http://localhost:5001";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST root of the album server.
    /// Env: `FOTOVAULT_SERVER_URL`
    /// Default: `http://localhost:5001/api`
    pub server_url: String,

    /// Base URL for preview images.
    /// Env: `FOTOVAULT_IMAGE_URL`
    /// Default: `http://localhost:5001`
    pub image_url: String,

    /// Directory holding the local session database.
    /// Env: `FOTOVAULT_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FOTOVAULT_SERVER_URL") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }

        if let Ok(url) = std::env::var("FOTOVAULT_IMAGE_URL") {
            if !url.is_empty() {
                config.image_url = url;
            }
        }

        if let Ok(dir) = std::env::var("FOTOVAULT_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }
}
