//! Application layer: pagination, grid rows and per-row cover loading.

/// Per-row cover loading with cancellation on reuse.
pub mod cell_load_coordinator;
/// Pagination state machine.
pub mod paginator;
/// Ordered grid rows.
pub mod results_grid;

pub use cell_load_coordinator::{CellDisplay, CellLoadCoordinator};
pub use paginator::{Paginator, PaginatorError, PaginatorEvent, PaginatorState};
pub use results_grid::ResultsGrid;
