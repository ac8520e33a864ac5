//! In-memory cost-bounded LRU cache for decoded covers.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CoverImage, ImageKey};

/// Default total cost budget, in bytes of decoded pixel data.
pub const DEFAULT_COST_LIMIT: usize = 50_000_000;

/// LRU cache whose capacity is an aggregate cost rather than an entry count.
///
/// Inserting past the limit evicts least-recently-used entries until the
/// resident cost is back under budget.
pub struct CostBoundedCache {
    inner: Mutex<Inner>,
    cost_limit: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct Inner {
    entries: LruCache<ImageKey, CoverImage>,
    total_cost: usize,
}

impl CostBoundedCache {
    /// Creates a new cache with the given cost budget.
    #[must_use]
    pub fn new(cost_limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
            cost_limit,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Maximum aggregate cost.
    #[must_use]
    pub const fn cost_limit(&self) -> usize {
        self.cost_limit
    }

    /// Looks up an entry and marks it as recently used.
    pub async fn get(&self, key: &ImageKey) -> Option<CoverImage> {
        let mut inner = self.inner.lock().await;
        if let Some(image) = inner.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(image.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    /// Looks up an entry without promoting it.
    pub async fn peek(&self, key: &ImageKey) -> Option<CoverImage> {
        self.inner.lock().await.entries.peek(key).cloned()
    }

    /// Stores an entry, evicting older ones as needed.
    ///
    /// Returns false when the entry alone exceeds the budget and was not kept.
    pub async fn put(&self, key: ImageKey, image: CoverImage) -> bool {
        let cost = image.cost();
        if cost > self.cost_limit {
            debug!(key = %key, cost, limit = self.cost_limit, "Image exceeds cache budget");
            return false;
        }

        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.entries.put(key.clone(), image) {
            inner.total_cost -= previous.cost();
        }
        inner.total_cost += cost;

        while inner.total_cost > self.cost_limit {
            let Some((evicted, old)) = inner.entries.pop_lru() else {
                break;
            };
            inner.total_cost -= old.cost();
            debug!(key = %evicted, cost = old.cost(), "Evicted image from memory cache");
        }

        trace!(key = %key, cost, total = inner.total_cost, "Stored image in memory cache");
        true
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    #[allow(missing_docs)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sum of the costs of all resident entries.
    pub async fn total_cost(&self) -> usize {
        self.inner.lock().await.total_cost
    }

    /// Removes all entries and resets the aggregate cost.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.total_cost = 0;
        debug!("Cleared memory image cache");
    }

    /// Returns cache statistics.
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let inner = self.inner.lock().await;
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: inner.entries.len(),
            cost: inner.total_cost,
        }
    }
}

impl Default for CostBoundedCache {
    fn default() -> Self {
        Self::new(DEFAULT_COST_LIMIT)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Current resident cost.
    pub cost: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images ({} bytes), {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.cost, self.hit_rate, self.hits, self.misses
        )
    }
}
