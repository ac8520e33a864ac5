//! Shared cover image cache: memory first, network on miss.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::entities::{CoverImage, ImageKey};
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::{ImageDecoderPort, ImageTransportPort};

use super::memory_cache::{CacheStats, CostBoundedCache};

/// Process-wide cover cache, shared by every row through an `Arc`.
///
/// Concurrent misses for the same URL may both hit the network; the last
/// decoded copy wins the slot.
pub struct ImageCache {
    memory: CostBoundedCache,
    transport: Arc<dyn ImageTransportPort>,
    decoder: Arc<dyn ImageDecoderPort>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("cost_limit", &self.memory.cost_limit())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Creates a cache holding at most `cost_limit` bytes of decoded covers.
    #[must_use]
    pub fn new(
        cost_limit: usize,
        transport: Arc<dyn ImageTransportPort>,
        decoder: Arc<dyn ImageDecoderPort>,
    ) -> Self {
        Self {
            memory: CostBoundedCache::new(cost_limit),
            transport,
            decoder,
        }
    }

    /// Loads the cover at `url`, decoding it at `scale`.
    ///
    /// Returns `Ok(None)` when `url` is absent or not an absolute URL.
    ///
    /// # Errors
    /// Returns the transport error if the download fails, or
    /// [`ImageError::Decode`] if the bytes are not a supported image.
    pub async fn load(&self, url: Option<&str>, scale: f32) -> ImageResult<Option<CoverImage>> {
        let Some(key) = url.and_then(ImageKey::parse) else {
            trace!(url = ?url, "No usable cover URL");
            return Ok(None);
        };

        if let Some(image) = self.memory.get(&key).await {
            return Ok(Some(image));
        }

        debug!(key = %key, "Downloading cover from network");
        let bytes = self.transport.fetch_bytes(key.url()).await?;
        let size = bytes.len();

        let image = self
            .decoder
            .decode(bytes, scale)
            .await
            .ok_or_else(|| ImageError::Decode(format!("{size} bytes from {key} are not an image")))?;

        self.memory.put(key, image.clone()).await;
        Ok(Some(image))
    }

    /// Returns a cached cover without touching the network.
    pub async fn cached(&self, url: &str) -> Option<CoverImage> {
        let key = ImageKey::parse(url)?;
        self.memory.peek(&key).await
    }

    /// Hit, miss and size counters.
    pub async fn stats(&self) -> CacheStats {
        self.memory.stats().await
    }

    /// Current aggregate cost of cached covers.
    pub async fn total_cost(&self) -> usize {
        self.memory.total_cost().await
    }

    /// Drops every cached cover.
    pub async fn clear(&self) {
        self.memory.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use mockall::predicate::eq;
    use reqwest::Url;

    use super::*;
    use crate::domain::ports::mocks::{FakeDecoder, MockImageTransportPort};
    use crate::infrastructure::image::DEFAULT_COST_LIMIT;

    const COVER_URL: &str = "https://covers.example.com/harry.jpg";

    fn cache_with(transport: MockImageTransportPort) -> ImageCache {
        ImageCache::new(
            DEFAULT_COST_LIMIT,
            Arc::new(transport),
            Arc::new(FakeDecoder),
        )
    }

    #[tokio::test]
    async fn test_second_load_is_cache_hit() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .with(eq(Url::parse(COVER_URL).unwrap()))
            .times(1)
            .returning(|_| Ok(FakeDecoder::encode(40, 60)));
        let cache = cache_with(transport);

        let first = cache.load(Some(COVER_URL), 1.0).await.unwrap().unwrap();
        let second = cache.load(Some(COVER_URL), 1.0).await.unwrap().unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_equivalent_urls_share_entry() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .times(1)
            .returning(|_| Ok(FakeDecoder::encode(4, 4)));
        let cache = cache_with(transport);

        cache.load(Some(COVER_URL), 1.0).await.unwrap();
        let again = cache
            .load(Some("HTTPS://COVERS.example.com/harry.jpg"), 1.0)
            .await
            .unwrap();

        assert!(again.is_some());
    }

    #[tokio::test]
    async fn test_absent_or_invalid_url_returns_none() {
        let mut transport = MockImageTransportPort::new();
        transport.expect_fetch_bytes().never();
        let cache = cache_with(transport);

        assert!(cache.load(None, 1.0).await.unwrap().is_none());
        assert!(cache.load(Some("not a url"), 1.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_fail_with_decode_error() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .returning(|_| Ok(Bytes::from_static(b"<html>not found</html>")));
        let cache = cache_with(transport);

        let result = cache.load(Some(COVER_URL), 1.0).await;

        assert!(matches!(result, Err(ImageError::Decode(_))));
        assert!(cache.cached(COVER_URL).await.is_none());
    }

    #[tokio::test]
    async fn test_network_error_propagates() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .returning(|_| Err(ImageError::Network("connection reset".into())));
        let cache = cache_with(transport);

        let result = cache.load(Some(COVER_URL), 1.0).await;

        assert!(matches!(result, Err(ImageError::Network(_))));
    }

    #[tokio::test]
    async fn test_scale_passed_to_decoder() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .returning(|_| Ok(FakeDecoder::encode(100, 200)));
        let cache = cache_with(transport);

        let image = cache.load(Some(COVER_URL), 0.5).await.unwrap().unwrap();

        assert!((image.scale() - 0.5).abs() < f32::EPSILON);
        assert_eq!(image.display_size(), (50, 100));
    }

    #[tokio::test]
    async fn test_eviction_keeps_cost_within_budget() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        let mut transport = MockImageTransportPort::new();
        transport.expect_fetch_bytes().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            // 100x100 RGB, cost 30_000.
            Ok(FakeDecoder::encode(100, 100))
        });
        let cache = ImageCache::new(100_000, Arc::new(transport), Arc::new(FakeDecoder));

        for n in 0..8 {
            let url = format!("https://covers.example.com/{n}.jpg");
            cache.load(Some(&url), 1.0).await.unwrap();
            assert!(cache.total_cost().await <= 100_000);
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 8);
        assert_eq!(cache.stats().await.size, 3);
    }

    #[tokio::test]
    async fn test_image_over_budget_is_returned_but_not_cached() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .times(2)
            // 10x10 RGB, cost 300.
            .returning(|_| Ok(FakeDecoder::encode(10, 10)));
        let cache = ImageCache::new(100, Arc::new(transport), Arc::new(FakeDecoder));

        let image = cache.load(Some(COVER_URL), 1.0).await.unwrap().unwrap();
        assert_eq!(image.width(), 10);
        assert!(cache.cached(COVER_URL).await.is_none());
        assert_eq!(cache.total_cost().await, 0);

        assert!(cache.load(Some(COVER_URL), 1.0).await.unwrap().is_some());
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_cache() {
        let mut transport = MockImageTransportPort::new();
        transport
            .expect_fetch_bytes()
            .returning(|_| Ok(FakeDecoder::encode(8, 8)));
        let cache = Arc::new(cache_with(transport));

        let tasks: Vec<_> = (0..16)
            .map(|n| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let url = format!("https://covers.example.com/{}.jpg", n % 4);
                    cache.load(Some(&url), 1.0).await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().unwrap().is_some());
        }

        let stats = cache.stats().await;
        assert_eq!(stats.size, 4);
        assert_eq!(stats.cost, 4 * 8 * 8 * 3);
    }
}
