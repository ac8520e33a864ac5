//! Port definitions for cover image retrieval and decoding.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::domain::entities::CoverImage;
use crate::domain::errors::ImageResult;

/// Port for downloading raw image bytes.
/// Implementations must be thread-safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageTransportPort: Send + Sync {
    /// Downloads the resource at `url`.
    async fn fetch_bytes(&self, url: &Url) -> ImageResult<Bytes>;
}

/// Port for turning encoded bytes into a displayable image.
#[async_trait]
pub trait ImageDecoderPort: Send + Sync {
    /// Decodes `bytes` at the given display scale.
    /// Returns `None` if the bytes are not a supported image.
    async fn decode(&self, bytes: Bytes, scale: f32) -> Option<CoverImage>;
}
