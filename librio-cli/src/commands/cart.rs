//! Cart commands

use super::{format_price, require_item};
use anyhow::Result;
use librio_core::{CatalogStore, ItemId};
use serde::Serialize;

/// Cart output for --json
#[derive(Serialize)]
struct CartSummary<'a> {
    lines: &'a [librio_core::CartLine],
    item_count: u64,
    total: rust_decimal::Decimal,
}

/// Add units of a catalog book to the cart
pub async fn cart_add(store: &CatalogStore, id: &str, quantity: u32, json: bool) -> Result<()> {
    let item = require_item(store, id).await?;
    let previous = store
        .cart()
        .await
        .line(&item.id)
        .map_or(0, |line| line.quantity);
    let line_quantity = store.add_to_cart(&item, quantity).await;

    if line_quantity < previous.saturating_add(quantity) {
        tracing::warn!(
            "Quantity for {} capped at {} per book",
            item.id,
            line_quantity
        );
    }
    if json {
        return cart_show(store, true).await;
    }
    println!("{} x {} in cart", line_quantity, item.title);
    Ok(())
}

/// Replace the quantity of a cart line
pub async fn cart_set(store: &CatalogStore, id: &str, quantity: u32, json: bool) -> Result<()> {
    let id = ItemId::new(id);
    if store.cart().await.line(&id).is_none() {
        anyhow::bail!("Book {} is not in the cart", id);
    }

    store.set_cart_quantity(&id, quantity).await;
    if json {
        return cart_show(store, true).await;
    }
    match store.cart().await.line(&id) {
        Some(line) => println!("{} x {} in cart", line.quantity, line.item.title),
        None => println!("Removed {} from cart", id),
    }
    Ok(())
}

/// Remove a line from the cart
pub async fn cart_remove(store: &CatalogStore, id: &str) -> Result<()> {
    if store.remove_from_cart(&ItemId::new(id)).await {
        println!("Removed {} from cart", id);
    } else {
        println!("Book {} was not in the cart", id);
    }
    Ok(())
}

/// Empty the cart
pub async fn cart_clear(store: &CatalogStore) -> Result<()> {
    store.clear_cart().await;
    println!("Cart cleared");
    Ok(())
}

/// Show cart lines, item count, and total
pub async fn cart_show(store: &CatalogStore, json: bool) -> Result<()> {
    let cart = store.cart().await;

    if json {
        let summary = CartSummary {
            lines: cart.lines(),
            item_count: cart.item_count(),
            total: cart.total(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    let currency = store.preferences().await.currency;
    for line in cart.lines() {
        println!(
            "{}  {} x {}  {}",
            line.item.id,
            line.quantity,
            line.item.title,
            format_price(line.subtotal(), &currency)
        );
    }
    println!("Items:       {}", cart.item_count());
    println!("Total:       {}", format_price(cart.total(), &currency));
    Ok(())
}
