//! In-memory cart state.
//!
//! [`CartStore`] owns the authoritative list of line items for the active
//! session. Mutations are synchronous and apply in call order; readers see
//! a consistent snapshot, never a partially-applied change. Items whose
//! quantity would reach zero are removed in the same operation, so a
//! zero-quantity line is never observable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warium_core::{CartItemId, ProductId};

/// Image shown when the backing product data carries none.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// One product+variant+quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Stable identifier of the cart entry itself, not the product.
    pub id: CartItemId,
    /// Reference to the product; looked up externally for display.
    pub product_id: ProductId,
    pub name: String,
    /// Non-negative unit price at full precision.
    pub unit_price: Decimal,
    /// Always >= 1 while the item is in the store.
    pub quantity: u32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub image_url: String,
}

impl CartLineItem {
    /// Price of this line: unit price times quantity, full precision.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The authoritative in-memory cart for the active session.
///
/// Line items keep insertion order; the checkout summary and the order
/// intent's line item references both rely on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartStore {
    items: Vec<CartLineItem>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a store from externally fetched rows (cart hydration).
    ///
    /// Rows that arrive with a zero quantity are dropped rather than
    /// stored, keeping the quantity >= 1 invariant from the first read.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let items = items
            .into_iter()
            .filter(|item| {
                if item.quantity == 0 {
                    debug!(item_id = %item.id, "dropping zero-quantity cart row");
                    return false;
                }
                true
            })
            .collect();
        Self { items }
    }

    /// The current ordered sequence of line items.
    #[must_use]
    pub fn snapshot(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines in the cart.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add a line item to the end of the cart.
    ///
    /// If the id is already present the existing line is replaced in
    /// place; the store mirrors one row per backend cart entry.
    pub fn add_item(&mut self, item: CartLineItem) {
        if item.quantity == 0 {
            debug!(item_id = %item.id, "ignoring zero-quantity cart row");
            return;
        }
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    /// Increment an item's quantity by 1.
    ///
    /// Unknown ids are a stale UI reference, not a fault: logged at debug
    /// and ignored.
    pub fn increase_quantity(&mut self, id: &CartItemId) {
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            debug!(item_id = %id, "increase ignored for unknown cart item");
        }
    }

    /// Decrement an item's quantity by 1, removing it when it hits zero.
    ///
    /// Removal happens in the same call, so no consumer can observe the
    /// item at quantity 0. Unknown ids are logged at debug and ignored.
    pub fn decrease_quantity(&mut self, id: &CartItemId) {
        let Some(pos) = self.items.iter().position(|item| &item.id == id) else {
            debug!(item_id = %id, "decrease ignored for unknown cart item");
            return;
        };
        if let Some(item) = self.items.get_mut(pos) {
            if item.quantity > 1 {
                item.quantity -= 1;
                return;
            }
        }
        self.items.remove(pos);
    }

    /// Remove an item unconditionally. Absent ids are ignored.
    pub fn remove_item(&mut self, id: &CartItemId) {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        if self.items.len() == before {
            debug!(item_id = %id, "remove ignored for unknown cart item");
        }
    }

    /// Empty the cart (checkout completed or the session user changed).
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
