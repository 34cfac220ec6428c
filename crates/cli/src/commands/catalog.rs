//! Catalog browsing.

use atelier_core::{ProductId, ProductQuery, ProductSort};
use serde_json::json;

use super::{CliError, Context, print_json, settled};

pub async fn list(
    ctx: &Context,
    sort: Option<ProductSort>,
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<(), CliError> {
    let catalog = ctx.store.catalog();
    let query = ProductQuery {
        sort,
        search,
        page,
        limit,
    };
    let outcome = catalog.list(&ctx.api, query).await;
    let state = catalog.snapshot();
    settled("products list", outcome, state.error())?;

    if let Some((_, listing)) = &state.data().listing {
        tracing::info!(
            total = listing.total,
            page = listing.page,
            total_pages = listing.total_pages,
            "Products loaded"
        );
        let rows: Vec<_> = listing
            .products
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "price": p.price.effective(),
                    "onSale": p.price.is_on_sale(),
                    "inStock": p.in_stock(),
                })
            })
            .collect();
        print_json(&json!({ "products": rows, "hasNext": listing.has_next() }));
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: &ProductId) -> Result<(), CliError> {
    let catalog = ctx.store.catalog();
    let outcome = catalog.load_product(&ctx.api, id).await;
    let state = catalog.snapshot();
    settled("products show", outcome, state.error())?;

    if let Some(product) = &state.data().product {
        print_json(&json!(product));
    }
    Ok(())
}
