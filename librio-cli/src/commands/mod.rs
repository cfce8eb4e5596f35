//! CLI command implementations

mod cart;
mod catalog;
mod prefs;

pub use cart::{cart_add, cart_clear, cart_remove, cart_set, cart_show};
pub use catalog::{delete, list, publish, show, update, DraftArgs, PatchArgs};
pub use prefs::{prefs_reset, prefs_set, prefs_show};

use librio_core::{CatalogStore, Item, ItemId};
use rust_decimal::Decimal;

/// Look up an item that must exist
async fn require_item(store: &CatalogStore, id: &str) -> anyhow::Result<Item> {
    store
        .find_item_by_id(&ItemId::new(id))
        .await
        .ok_or_else(|| anyhow::anyhow!("No book with id {}", id))
}

fn format_price(amount: Decimal, currency: &str) -> String {
    format!("{} {}", currency, amount.round_dp(2).normalize())
}
