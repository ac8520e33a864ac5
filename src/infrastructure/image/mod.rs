//! Cover image infrastructure.
//!
//! This module provides:
//! - Memory caching with cost-bounded LRU eviction
//! - The shared `ImageCache` service
//! - HTTP transport and `image` crate decoding adapters

pub mod cover_cache;
pub mod decoder;
pub mod memory_cache;
pub mod transport;

pub use cover_cache::ImageCache;
pub use decoder::ImageCrateDecoder;
pub use memory_cache::{CacheStats, CostBoundedCache, DEFAULT_COST_LIMIT};
pub use transport::HttpImageTransport;
