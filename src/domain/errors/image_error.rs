//! Cover image error types.

use thiserror::Error;

/// Errors that can occur while loading a cover image.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Downloading the image bytes failed.
    #[error("network error: {0}")]
    Network(String),
    /// Bytes were fetched but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for image operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;
