//! Ordered row model for the results grid.

use std::collections::HashSet;

use crate::application::paginator::{Paginator, PaginatorEvent};
use crate::domain::entities::{Item, ItemId};

/// Row identifiers in display order, built up page by page.
///
/// Each page's identifiers are appended in arrival order; identifiers that
/// already have a row are skipped so a row never appears twice.
#[derive(Debug, Clone, Default)]
pub struct ResultsGrid {
    rows: Vec<ItemId>,
    seen: HashSet<ItemId>,
}

impl ResultsGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page of identifiers. Returns the range of new row indices.
    pub fn append(&mut self, ids: impl IntoIterator<Item = ItemId>) -> std::ops::Range<usize> {
        let start = self.rows.len();
        for id in ids {
            if self.seen.insert(id.clone()) {
                self.rows.push(id);
            }
        }
        start..self.rows.len()
    }

    /// Applies a paginator event; only page arrivals change rows.
    pub fn handle_event(&mut self, event: &PaginatorEvent) -> Option<std::ops::Range<usize>> {
        match event {
            PaginatorEvent::PageAppended(ids) => Some(self.append(ids.iter().cloned())),
            PaginatorEvent::StateChanged(_) | PaginatorEvent::QueryChanged(_) => None,
        }
    }

    /// Row ids in display order.
    #[must_use]
    pub fn rows(&self) -> &[ItemId] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the grid has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves the item shown at `index`.
    #[must_use]
    pub fn item_at(&self, index: usize, paginator: &Paginator) -> Option<Item> {
        self.rows.get(index).and_then(|id| paginator.item(id))
    }

    /// Removes all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.seen.clear();
    }
}
