//! Domain entities.

mod cover_image;
mod item;
mod item_page;

pub use cover_image::{CoverImage, ImageKey, TargetSize};
pub use item::{Cover, Format, Item, ItemId, Person};
pub use item_page::{ItemPage, PageToken};
