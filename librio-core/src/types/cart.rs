//! Shopping cart lines and totals

use super::{Item, ItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (item, quantity) pairing in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Snapshot of the item at the time it was added
    pub item: Item,

    /// Always at least 1
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.item.price * Decimal::from(self.quantity)
    }
}

/// Ordered cart, at most one line per item id.
///
/// Serialized as a bare JSON array of lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item.id == id)
    }

    /// Add `quantity` units of `item`, accumulating into an existing line.
    ///
    /// `max` caps the resulting quantity when set. Returns the line's quantity
    /// afterwards (0 when nothing was added and no line exists).
    pub fn add(&mut self, item: Item, quantity: u32, max: Option<u32>) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity = clamp(line.quantity.saturating_add(quantity), max);
            return line.quantity;
        }

        let quantity = clamp(quantity, max);
        if quantity == 0 {
            return 0;
        }
        self.lines.push(CartLine { item, quantity });
        quantity
    }

    /// Replace a line's quantity; 0 removes the line.
    /// Returns whether the cart changed.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: u32, max: Option<u32>) -> bool {
        let quantity = clamp(quantity, max);
        if quantity == 0 {
            return self.remove(id);
        }

        match self.lines.iter_mut().find(|l| &l.item.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.item.id != id);
        self.lines.len() != before
    }

    /// Sum of price × quantity over all lines
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of quantities over all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// A zero limit means no limit, so an existing line never clamps to 0
fn clamp(quantity: u32, max: Option<u32>) -> u32 {
    match max {
        Some(max) if max > 0 => quantity.min(max),
        _ => quantity,
    }
}
