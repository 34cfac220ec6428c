//! Cart line types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartLineId, ProductId, StoreId};

/// Identity of a cart line as seen by the shopper.
///
/// Two lines with the same product, size and colour are the same line; the
/// backend merges them and returns the merged line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartLineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

/// A line in the shopper's cart, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line ID, used for update and removal.
    pub id: CartLineId,
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    /// Store fulfilling this line.
    pub store_id: StoreId,
    /// Price of one unit at the time the line was last updated.
    #[serde(alias = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl CartItem {
    /// The line's uniqueness key.
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Whether this line has the given key, without allocating one.
    #[must_use]
    pub fn matches(&self, key: &CartLineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Request body for adding a line to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub store_id: StoreId,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl NewCartItem {
    /// The key the new line will occupy.
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}
