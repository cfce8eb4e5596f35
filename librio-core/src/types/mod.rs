//! Core types for the Librio catalog and cart

mod cart;
mod draft;
mod item;
mod preferences;

pub use cart::{Cart, CartLine};
pub use draft::{
    Draft, DraftField, ItemPatch, DEFAULT_DESCRIPTION, DEFAULT_GENRE, DEFAULT_IMAGE,
    DEFAULT_PUBLISHER, DEFAULT_SELLER,
};
pub use item::{Item, ItemId, ItemStatus};
pub use preferences::{PreferenceKey, Preferences, SortOrder, Theme};
