//! Cover decoding backed by the `image` crate.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::entities::CoverImage;
use crate::domain::ports::ImageDecoderPort;

/// Decodes PNG, JPEG and WebP covers on the blocking thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn decode_blocking(bytes: &[u8], scale: f32) -> Option<CoverImage> {
        match image::load_from_memory(bytes) {
            Ok(pixels) => Some(CoverImage::new(pixels, scale)),
            Err(e) => {
                debug!(error = %e, len = bytes.len(), "Failed to decode image");
                None
            }
        }
    }
}

#[async_trait]
impl ImageDecoderPort for ImageCrateDecoder {
    async fn decode(&self, bytes: Bytes, scale: f32) -> Option<CoverImage> {
        tokio::task::spawn_blocking(move || Self::decode_blocking(&bytes, scale))
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Decode task panicked");
                None
            })
    }
}
