//! Deduplicating store of fetched catalog items.

use std::collections::HashMap;

use crate::domain::entities::{Item, ItemId};

/// Identifier-indexed collection of items.
///
/// Appending is first-write-wins: an item whose identifier is already held
/// never replaces the stored entry, even if its other fields differ.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: HashMap<ItemId, Item>,
}

impl ItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `items`; the first of duplicate ids wins.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut store = Self::new();
        store.append(items);
        store
    }

    /// Returns the item stored under `id`.
    #[must_use]
    pub fn lookup(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Merges items into the store, keeping existing entries on conflict.
    /// Returns the number of newly inserted items.
    pub fn append(&mut self, items: impl IntoIterator<Item = Item>) -> usize {
        let before = self.items.len();
        for item in items {
            self.items.entry(item.id().clone()).or_insert(item);
        }
        self.items.len() - before
    }

    /// Number of distinct items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with `id` is stored.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Any one held item, in no particular order.
    #[must_use]
    pub fn first(&self) -> Option<&Item> {
        self.items.values().next()
    }

    /// Unordered snapshot of every stored item.
    #[must_use]
    pub fn all(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, title: &str) -> Item {
        Item::new(id, title, vec![], vec![], vec![])
    }

    #[test]
    fn test_append_keeps_first_write() {
        let mut store = ItemStore::new();
        store.append([item(1, "A"), item(2, "B")]);
        store.append([item(1, "A prime"), item(3, "C")]);

        assert_eq!(store.count(), 3);
        assert_eq!(store.lookup(&ItemId::from(1)).unwrap().title(), "A");
    }

    #[test]
    fn test_duplicates_within_one_batch() {
        let mut store = ItemStore::new();
        let inserted = store.append([item(7, "first"), item(7, "second")]);

        assert_eq!(inserted, 1);
        assert_eq!(store.lookup(&ItemId::from(7)).unwrap().title(), "first");
    }

    #[test]
    fn test_lookup_unknown() {
        let store = ItemStore::from_items([item(1, "A")]);
        assert!(store.lookup(&ItemId::from(99)).is_none());
        assert!(store.contains(&ItemId::from(1)));
    }

    #[test]
    fn test_all_and_first() {
        let empty = ItemStore::new();
        assert!(empty.is_empty());
        assert!(empty.first().is_none());

        let store = ItemStore::from_items([item(1, "A"), item(2, "B")]);
        let mut titles: Vec<_> = store.all().iter().map(|i| i.title().to_string()).collect();
        titles.sort();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(store.first().is_some());
    }
}
