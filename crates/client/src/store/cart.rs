//! Cart slice.

use atelier_core::{CartItem, CartLineId, CartLineKey, NewCartItem};
use rust_decimal::Decimal;

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::Backend;

const FETCH_FAILED: &str = "Failed to fetch cart";
const ADD_FAILED: &str = "Failed to add item to cart";
const UPDATE_FAILED: &str = "Failed to update cart item";
const REMOVE_FAILED: &str = "Failed to remove item from cart";
const CLEAR_FAILED: &str = "Failed to clear cart";
const QUANTITY_TOO_LOW: &str = "Quantity must be at least 1";

/// The shopper's cart lines.
#[derive(Debug)]
pub struct CartSlice {
    slice: Slice<Vec<CartItem>>,
}

impl Default for CartSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("cart", Vec::new()),
        }
    }
}

impl CartSlice {
    pub async fn fetch(&self, backend: &impl Backend) -> Lifecycle {
        self.slice
            .run("fetch", FETCH_FAILED, backend.fetch_cart(), |items, fetched| {
                *items = fetched;
            })
            .await
    }

    /// Add a line. The returned line replaces the local line with the same
    /// ID, else the one with the same product, size and colour, else it is
    /// appended.
    pub async fn add_item(&self, backend: &impl Backend, item: NewCartItem) -> Lifecycle {
        if item.quantity == 0 {
            return self.slice.reject_locally("add_item", QUANTITY_TOO_LOW);
        }
        let key = item.key();
        self.slice
            .run("add_item", ADD_FAILED, backend.add_cart_item(&item), |items, line| {
                merge_line(items, line, &key);
            })
            .await
    }

    pub async fn update_item(
        &self,
        backend: &impl Backend,
        id: &CartLineId,
        quantity: u32,
    ) -> Lifecycle {
        if quantity == 0 {
            return self.slice.reject_locally("update_item", QUANTITY_TOO_LOW);
        }
        self.slice
            .run(
                "update_item",
                UPDATE_FAILED,
                backend.update_cart_item(id, quantity),
                |items, line| {
                    if let Some(existing) = items.iter_mut().find(|i| i.id == line.id) {
                        *existing = line;
                    }
                },
            )
            .await
    }

    pub async fn remove_item(&self, backend: &impl Backend, id: &CartLineId) -> Lifecycle {
        self.slice
            .run("remove_item", REMOVE_FAILED, backend.remove_cart_item(id), |items, ()| {
                items.retain(|i| &i.id != id);
            })
            .await
    }

    /// Empty the cart once the backend confirms.
    pub async fn clear(&self, backend: &impl Backend) -> Lifecycle {
        self.slice
            .run("clear", CLEAR_FAILED, backend.clear_cart(), |items, ()| items.clear())
            .await
    }

    /// Forget all lines locally, e.g. on sign-out.
    pub fn reset(&self) {
        self.slice.reset();
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Vec<CartItem>> {
        self.slice.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AsyncResource<Vec<CartItem>>> {
        self.slice.subscribe()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.slice.read(|r| r.data().clone())
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.slice
            .read(|r| r.data().iter().map(CartItem::line_total).sum())
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.slice
            .read(|r| r.data().iter().map(|i| i.quantity).sum())
    }

    /// Whether a line with this key is in the cart.
    #[must_use]
    pub fn contains(&self, key: &CartLineKey) -> bool {
        self.slice.read(|r| r.data().iter().any(|i| i.matches(key)))
    }
}

fn merge_line(items: &mut Vec<CartItem>, line: CartItem, requested: &CartLineKey) {
    let position = items
        .iter()
        .position(|i| i.id == line.id)
        .or_else(|| items.iter().position(|i| i.matches(requested)));
    match position.and_then(|index| items.get_mut(index)) {
        Some(existing) => *existing = line,
        None => items.push(line),
    }
}
