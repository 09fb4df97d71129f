//! Local image preparation.
//!
//! The server stores whatever bytes it is given, so the client normalises
//! every picked image to JPEG before upload, whatever format it was picked
//! in.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// JPEG quality used for uploads (0-100).
pub const UPLOAD_JPEG_QUALITY: u8 = 80;

/// Errors produced while preparing an image for upload.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Read an image file and re-encode it as JPEG at [`UPLOAD_JPEG_QUALITY`].
pub fn encode_for_upload(path: &Path) -> Result<Vec<u8>, MediaError> {
    let raw = std::fs::read(path).map_err(|source| MediaError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let decoded = image::load_from_memory(&raw)?;

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, UPLOAD_JPEG_QUALITY);
    decoded.write_with_encoder(encoder)?;

    tracing::debug!(
        path = %path.display(),
        raw_size = raw.len(),
        jpeg_size = out.get_ref().len(),
        "image re-encoded for upload"
    );

    Ok(out.into_inner())
}
