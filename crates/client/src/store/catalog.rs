//! Catalog slice: the product listing and the product being viewed.

use atelier_core::{Product, ProductId, ProductPage, ProductQuery};

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::Backend;

const LIST_FAILED: &str = "Failed to fetch products";
const PRODUCT_FAILED: &str = "Failed to fetch product";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Last listing page loaded, with the query that produced it.
    pub listing: Option<(ProductQuery, ProductPage)>,
    /// Product detail last loaded.
    pub product: Option<Product>,
}

#[derive(Debug)]
pub struct CatalogSlice {
    slice: Slice<Catalog>,
}

impl Default for CatalogSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("catalog", Catalog::default()),
        }
    }
}

impl CatalogSlice {
    pub async fn list(&self, backend: &impl Backend, query: ProductQuery) -> Lifecycle {
        self.slice
            .run("list", LIST_FAILED, backend.list_products(&query), |catalog, page| {
                catalog.listing = Some((query.clone(), page));
            })
            .await
    }

    pub async fn load_product(&self, backend: &impl Backend, id: &ProductId) -> Lifecycle {
        self.slice
            .run("load_product", PRODUCT_FAILED, backend.get_product(id), |catalog, product| {
                catalog.product = Some(product);
            })
            .await
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Catalog> {
        self.slice.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use atelier_core::ProductSort;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_sends_query_and_keeps_page() {
        let backend = ScriptedBackend::new();
        backend.respond(
            "list_products",
            json!({
                "products": [{"_id": "p1", "name": "Kurta", "price": {"regular": 30}}],
                "total": 1,
                "page": 1,
                "totalPages": 1
            }),
        );

        let catalog = CatalogSlice::default();
        let query = ProductQuery {
            sort: Some(ProductSort::Newest),
            ..ProductQuery::default()
        };
        assert_eq!(catalog.list(&backend, query.clone()).await, Lifecycle::Fulfilled);

        let state = catalog.snapshot();
        let (listed_query, page) = state.data().listing.as_ref().unwrap();
        assert_eq!(listed_query, &query);
        assert_eq!(page.products.len(), 1);
        assert_eq!(backend.calls_to("list_products")[0], json!({"sort": "newest"}));
    }

    #[tokio::test]
    async fn test_missing_product_keeps_previous() {
        let backend = ScriptedBackend::new();
        backend.respond("get_product", json!({"_id": "p1", "name": "Kurta", "price": {"regular": 30}}));
        backend.fail("get_product", 404, Some("Product not found"));

        let catalog = CatalogSlice::default();
        catalog.load_product(&backend, &ProductId::new("p1")).await;
        catalog.load_product(&backend, &ProductId::new("p2")).await;

        let state = catalog.snapshot();
        assert_eq!(state.error(), Some("Product not found"));
        assert_eq!(state.data().product.as_ref().unwrap().id.as_str(), "p1");
    }
}
