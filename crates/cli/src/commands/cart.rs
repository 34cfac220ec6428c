//! Cart commands. Each one fetches the cart first so the local slice
//! mirrors the backend before it is changed.

use atelier_core::{CartLineId, NewCartItem};
use serde_json::json;

use super::{CliError, Context, print_json, settled};

pub async fn show(ctx: &Context) -> Result<(), CliError> {
    fetch(ctx).await?;
    print_cart(ctx);
    Ok(())
}

pub async fn add(ctx: &Context, item: NewCartItem) -> Result<(), CliError> {
    fetch(ctx).await?;
    let cart = ctx.store.cart();
    let outcome = cart.add_item(&ctx.api, item).await;
    settled("cart add", outcome, cart.snapshot().error())?;
    print_cart(ctx);
    Ok(())
}

pub async fn update(ctx: &Context, id: &CartLineId, quantity: u32) -> Result<(), CliError> {
    fetch(ctx).await?;
    let cart = ctx.store.cart();
    let outcome = cart.update_item(&ctx.api, id, quantity).await;
    settled("cart update", outcome, cart.snapshot().error())?;
    print_cart(ctx);
    Ok(())
}

pub async fn remove(ctx: &Context, id: &CartLineId) -> Result<(), CliError> {
    fetch(ctx).await?;
    let cart = ctx.store.cart();
    let outcome = cart.remove_item(&ctx.api, id).await;
    settled("cart remove", outcome, cart.snapshot().error())?;
    print_cart(ctx);
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<(), CliError> {
    let cart = ctx.store.cart();
    let outcome = cart.clear(&ctx.api).await;
    settled("cart clear", outcome, cart.snapshot().error())?;
    tracing::info!("Cart cleared");
    Ok(())
}

async fn fetch(ctx: &Context) -> Result<(), CliError> {
    let cart = ctx.store.cart();
    let outcome = cart.fetch(&ctx.api).await;
    settled("cart fetch", outcome, cart.snapshot().error())
}

fn print_cart(ctx: &Context) {
    let cart = ctx.store.cart();
    print_json(&json!({
        "items": cart.items(),
        "itemCount": cart.item_count(),
        "total": cart.total(),
    }));
}
