//! Wishlist entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A saved product. Membership is by `product_id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WishlistItem {
    /// An entry saved now.
    #[must_use]
    pub fn now(product_id: ProductId) -> Self {
        Self {
            product_id,
            added_at: Some(Utc::now()),
        }
    }
}

