//! Order commands.

use atelier_core::{NewOrder, OrderId};
use serde_json::json;

use super::{CliError, Context, print_json, settled};

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let orders = ctx.store.orders();
    let outcome = orders.fetch_all(&ctx.api).await;
    settled("orders list", outcome, orders.snapshot().error())?;
    print_json(&json!({ "orders": orders.list() }));
    Ok(())
}

pub async fn show(ctx: &Context, id: &OrderId) -> Result<(), CliError> {
    let orders = ctx.store.orders();
    let outcome = orders.fetch(&ctx.api, id).await;
    settled("orders show", outcome, orders.snapshot().error())?;
    print_json(&json!(orders.current()));
    Ok(())
}

/// Check out the backend cart.
pub async fn place(ctx: &Context, order: NewOrder) -> Result<(), CliError> {
    let orders = ctx.store.orders();
    let outcome = orders.place(&ctx.api, order).await;
    settled("orders place", outcome, orders.snapshot().error())?;
    if let Some(placed) = orders.current() {
        tracing::info!(order_id = %placed.id, total = %placed.total_amount, "Order placed");
        print_json(&json!(placed));
    }
    Ok(())
}
