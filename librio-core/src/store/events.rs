//! Change notifications for store subscribers

use crate::types::ItemId;

/// Something in the store changed; views re-read what they display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new item was published
    ItemPublished { id: ItemId, title: String },

    /// An item's fields were updated
    ItemUpdated { id: ItemId },

    /// An item was removed from the catalog
    ItemDeleted { id: ItemId },

    /// The item list was replaced by a change from another session
    CatalogReloaded,

    /// Any cart mutation, local or from another session
    CartChanged,

    /// Any preference mutation, local or from another session
    PreferencesChanged,

    /// The loading flag flipped
    LoadingChanged { loading: bool },

    /// A backend failure was written to the error slot
    ErrorRaised { message: String },

    /// The error slot was emptied
    ErrorCleared,
}
