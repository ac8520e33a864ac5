//! Story Grid - paginated catalog search with asynchronous cover loading.
//!
//! This crate provides the core of a search results grid: an incremental
//! pagination state machine over a deduplicating item store, and a shared,
//! cost-bounded cover image cache with cancellable per-row loads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing pagination and row coordination.
pub mod application;
/// Domain layer containing entities, errors, port definitions and the item store.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "story-grid";
