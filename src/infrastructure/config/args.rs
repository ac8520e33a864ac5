//! Command line arguments.

use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(
    name = "story-grid",
    version,
    about = "Search the catalog and page through results with cover art",
    long_about = None
)]
/// Command line arguments.
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Search term.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of pages to fetch.
    #[arg(short, long)]
    pub pages: Option<usize>,

    /// Storefront identifier.
    #[arg(long, env = "STORY_GRID_STORE")]
    pub store: Option<String>,

    /// Catalog API base URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Image cache budget in bytes of decoded pixels.
    #[arg(long, value_name = "BYTES")]
    pub cache_cost_limit: Option<usize>,
}
