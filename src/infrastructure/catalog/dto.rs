use serde::Deserialize;

use crate::domain::entities::{Cover, Format, Item, ItemId, ItemPage, PageToken, Person};

/// Search endpoint response structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Query echoed back by the catalog.
    pub query: String,
    /// Cursor of the following page.
    #[serde(default)]
    pub next_page_token: Option<RawValue>,
    /// Result items.
    #[serde(default)]
    pub items: Vec<ItemResponse>,
}

/// Identifiers and tokens arrive as either strings or integers.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(u64),
}

impl RawValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    /// Catalog identifier; some responses omit it.
    #[serde(default)]
    pub id: Option<RawValue>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<PersonResponse>,
    #[serde(default)]
    pub narrators: Vec<PersonResponse>,
    #[serde(default)]
    pub formats: Vec<FormatResponse>,
}

#[allow(missing_docs)]
#[derive(Debug, Deserialize)]
pub struct PersonResponse {
    pub id: RawValue,
    pub name: String,
}

#[allow(missing_docs)]
#[derive(Debug, Deserialize)]
pub struct FormatResponse {
    pub cover: CoverResponse,
}

#[allow(missing_docs)]
#[derive(Debug, Deserialize)]
pub struct CoverResponse {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl From<SearchResponse> for ItemPage {
    fn from(response: SearchResponse) -> Self {
        let next_page_token = response
            .next_page_token
            .map(RawValue::into_string)
            .filter(|token| !token.is_empty())
            .map(PageToken::new);

        Self::new(
            response.query,
            next_page_token,
            response.items.into_iter().map(Item::from).collect(),
        )
    }
}

impl From<ItemResponse> for Item {
    fn from(item: ItemResponse) -> Self {
        let id = item
            .id
            .map_or_else(ItemId::generate, |raw| ItemId::new(raw.into_string()));

        Self::new(
            id,
            item.title,
            item.authors.into_iter().map(Person::from).collect(),
            item.narrators.into_iter().map(Person::from).collect(),
            item.formats.into_iter().map(Format::from).collect(),
        )
    }
}

impl From<PersonResponse> for Person {
    fn from(person: PersonResponse) -> Self {
        Self::new(person.id.into_string(), person.name)
    }
}

impl From<FormatResponse> for Format {
    fn from(format: FormatResponse) -> Self {
        let CoverResponse { url, width, height } = format.cover;
        let cover = match (width, height) {
            (Some(w), Some(h)) => Cover::new(url).with_dimensions(w, h),
            _ => Cover::new(url),
        };
        Self::new(cover)
    }
}
