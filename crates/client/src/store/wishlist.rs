//! Wishlist slice. Membership is keyed by product ID.

use std::collections::HashSet;

use atelier_core::{ProductId, WishlistItem};

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::Backend;

const LOAD_FAILED: &str = "Failed to load wishlist";

#[derive(Debug)]
pub struct WishlistSlice {
    slice: Slice<Vec<WishlistItem>>,
}

impl Default for WishlistSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("wishlist", Vec::new()),
        }
    }
}

impl WishlistSlice {
    /// Replace the local set with the backend's, keeping the first entry
    /// for each product.
    pub async fn load(&self, backend: &impl Backend) -> Lifecycle {
        self.slice
            .run("load", LOAD_FAILED, backend.fetch_wishlist(), |items, fetched| {
                let mut seen = HashSet::new();
                *items = fetched
                    .into_iter()
                    .filter(|item| seen.insert(item.product_id.clone()))
                    .collect();
            })
            .await
    }

    /// Save a product. Returns `false` if it was already saved.
    pub fn add(&self, product_id: ProductId) -> bool {
        let mut added = false;
        self.slice.update(|items| {
            if !items.iter().any(|i| i.product_id == product_id) {
                items.push(WishlistItem::now(product_id));
                added = true;
            }
        });
        added
    }

    /// Returns `false` if the product was not saved.
    pub fn remove(&self, product_id: &ProductId) -> bool {
        let mut removed = false;
        self.slice.update(|items| {
            let before = items.len();
            items.retain(|i| &i.product_id != product_id);
            removed = items.len() != before;
        });
        removed
    }

    /// Add if absent, remove if present. Returns whether the product is
    /// saved afterwards.
    pub fn toggle(&self, product_id: ProductId) -> bool {
        let mut saved = false;
        self.slice.update(|items| {
            let before = items.len();
            items.retain(|i| i.product_id != product_id);
            if items.len() == before {
                items.push(WishlistItem::now(product_id));
                saved = true;
            }
        });
        saved
    }

    pub fn clear(&self) {
        self.slice.update(Vec::clear);
    }

    pub fn reset(&self) {
        self.slice.reset();
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.slice
            .read(|r| r.data().iter().any(|i| &i.product_id == product_id))
    }

    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.slice.read(|r| r.data().clone())
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Vec<WishlistItem>> {
        self.slice.snapshot()
    }
}
