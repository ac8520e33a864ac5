//! Catalog search adapter.

mod client;
mod dto;

pub use client::{CatalogClient, CatalogClientConfig};
