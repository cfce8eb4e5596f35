//! Librio Core Library
//!
//! This crate provides the catalog-and-cart state for the Librio secondhand
//! book storefront. Views talk to a [`CatalogStore`]; cart and preferences are
//! mirrored to a key-value [`storage::StorageProvider`] through
//! [`cache::PersistentValue`] so they survive a reload.

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use context::{AppContext, Session};
pub use error::{BackendError, LibrioError, Result, StorageError, ValidationError};
pub use store::{CatalogStore, StoreEvent};
pub use types::{
    Cart, CartLine, Draft, DraftField, Item, ItemId, ItemPatch, ItemStatus, PreferenceKey,
    Preferences, SortOrder, Theme,
};
