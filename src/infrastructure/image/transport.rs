//! HTTP transport for cover image bytes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::warn;

use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::ImageTransportPort;

/// Downloads images with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpImageTransport {
    client: Client,
}

impl HttpImageTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> ImageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageTransportPort for HttpImageTransport {
    async fn fetch_bytes(&self, url: &Url) -> ImageResult<Bytes> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Cover request failed");
            ImageError::Network(format!("Request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageError::Network(format!("Failed to read body: {e}")))
    }
}
