//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::infrastructure::catalog::CatalogClientConfig;
use crate::infrastructure::image::DEFAULT_COST_LIMIT;

pub(super) const APP_NAME: &str = "story-grid";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from `config.toml` and overridden by CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Search term.
    #[serde(default = "default_query")]
    pub query: String,

    /// Maximum number of pages to walk.
    #[serde(default = "default_pages")]
    pub pages: usize,

    /// Catalog service configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Cover image configuration.
    #[serde(default)]
    pub images: ImageConfig,
}

/// Catalog service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Scheme and host of the catalog API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Storefront identifier, passed through to the catalog.
    #[serde(default = "default_store")]
    pub store: String,

    /// Retries after a failed page request.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            store: default_store(),
            retries: default_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    /// Builds the catalog client settings.
    #[must_use]
    pub fn client_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            base_url: self.base_url.clone(),
            store: self.store.clone(),
            retries: self.retries,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Cover image configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Total decoded bytes the memory cache may hold.
    #[serde(default = "default_cost_limit")]
    pub cost_limit: usize,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cover slot width in points.
    #[serde(default = "default_cover_width")]
    pub cover_width: f32,

    /// Cover slot height in points.
    #[serde(default = "default_cover_height")]
    pub cover_height: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cost_limit: default_cost_limit(),
            timeout_secs: default_timeout_secs(),
            cover_width: default_cover_width(),
            cover_height: default_cover_height(),
        }
    }
}

impl ImageConfig {
    /// Download timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_query() -> String {
    "harry".to_string()
}

const fn default_pages() -> usize {
    3
}

fn default_base_url() -> String {
    "https://api.storytel.net".to_string()
}

fn default_store() -> String {
    "STHP-SE".to_string()
}

const fn default_retries() -> u32 {
    2
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_cost_limit() -> usize {
    DEFAULT_COST_LIMIT
}

const fn default_cover_width() -> f32 {
    120.0
}

const fn default_cover_height() -> f32 {
    120.0
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(query) = args.query {
            self.query = query;
        }
        if let Some(pages) = args.pages {
            self.pages = pages;
        }
        if let Some(store) = args.store {
            self.catalog.store = store;
        }
        if let Some(base_url) = args.base_url {
            self.catalog.base_url = base_url;
        }
        if let Some(cost_limit) = args.cache_cost_limit {
            self.images.cost_limit = cost_limit;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::default(),
            query: default_query(),
            pages: default_pages(),
            catalog: CatalogConfig::default(),
            images: ImageConfig::default(),
        }
    }
}
