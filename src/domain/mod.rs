//! Domain layer with entities, errors, ports and the item store.

/// Domain entities.
pub mod entities;
/// Domain error types.
pub mod errors;
mod item_store;
/// Port traits implemented by infrastructure.
pub mod ports;

pub use item_store::ItemStore;
