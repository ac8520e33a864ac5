//! Catalog search result entities.

use std::hash::{Hash, Hasher};

/// Stable identifier of a catalog item, shared across pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new `ItemId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random identifier for items the catalog did not label.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// An author or narrator credited on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id: String,
    name: String,
}

impl Person {
    /// Creates a person from a catalog id and display name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Catalog identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Cover art descriptor. Pixel dimensions are optional because the catalog
/// does not always report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl Cover {
    /// Cover with unknown dimensions.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }

    /// Sets the known pixel dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Source URL as reported by the catalog.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Source width, if the catalog reported it.
    #[must_use]
    pub const fn width(&self) -> Option<u32> {
        self.width
    }

    /// Source height, if the catalog reported it.
    #[must_use]
    pub const fn height(&self) -> Option<u32> {
        self.height
    }
}

/// A published format of an item (e.g. audiobook or ebook), carrying its cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    cover: Cover,
}

impl Format {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(cover: Cover) -> Self {
        Self { cover }
    }

    /// Cover art of this format.
    #[must_use]
    pub const fn cover(&self) -> &Cover {
        &self.cover
    }
}

/// A single catalog search result.
///
/// Two items are equal iff their identifiers match; the remaining fields do
/// not take part in comparison or hashing.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    title: String,
    authors: Vec<Person>,
    narrators: Vec<Person>,
    formats: Vec<Format>,
}

impl Item {
    /// Creates an item.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        authors: Vec<Person>,
        narrators: Vec<Person>,
        formats: Vec<Format>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
            narrators,
            formats,
        }
    }

    /// Catalog identifier.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Authors, in catalog order.
    #[must_use]
    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    /// Narrators, in catalog order.
    #[must_use]
    pub fn narrators(&self) -> &[Person] {
        &self.narrators
    }

    /// Available formats, in catalog order.
    #[must_use]
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Cover of the first listed format.
    #[must_use]
    pub fn cover(&self) -> Option<&Cover> {
        self.formats.first().map(Format::cover)
    }

    /// Row text crediting the authors, e.g. `by J.K. Rowling,Stephen Fry`.
    #[must_use]
    pub fn authors_line(&self) -> String {
        format!("by {}", join_names(&self.authors))
    }

    /// Row text crediting the narrators.
    #[must_use]
    pub fn narrators_line(&self) -> String {
        format!("with {}", join_names(&self.narrators))
    }
}

fn join_names(people: &[Person]) -> String {
    people
        .iter()
        .map(Person::name)
        .collect::<Vec<_>>()
        .join(",")
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
