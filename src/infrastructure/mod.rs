//! Infrastructure layer with external service adapters.

/// Catalog search client.
pub mod catalog;
/// Application configuration.
pub mod config;
/// Cover image caching, downloading and decoding.
pub mod image;

pub use catalog::{CatalogClient, CatalogClientConfig};
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use self::image::{
    CacheStats, CostBoundedCache, HttpImageTransport, ImageCache, ImageCrateDecoder,
};
