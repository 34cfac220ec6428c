//! Style assistant.

use atelier_core::{ChatRole, StylePreferences};
use rust_decimal::Decimal;
use serde_json::json;

use super::{CliError, Context, print_json, settled};

/// One chat turn. The CLI keeps no conversation between invocations.
pub async fn chat(ctx: &Context, message: &str) -> Result<(), CliError> {
    let ai = ctx.store.ai();
    let outcome = ai.send_message(&ctx.api, message).await;
    settled("chat", outcome, ai.snapshot().error())?;

    let reply = ai
        .chat()
        .into_iter()
        .rev()
        .find(|m| m.role == ChatRole::Assistant)
        .map(|m| m.content)
        .unwrap_or_default();
    print_json(&json!({ "reply": reply }));
    Ok(())
}

pub async fn suggest(
    ctx: &Context,
    occasion: String,
    style: String,
    budget: Decimal,
) -> Result<(), CliError> {
    let ai = ctx.store.ai();
    let preferences = StylePreferences {
        occasion,
        style,
        budget,
    };
    let outcome = ai.generate_suggestions(&ctx.api, preferences).await;
    let state = ai.snapshot();
    settled("suggest", outcome, state.error())?;

    let rows: Vec<_> = state
        .data()
        .suggestions
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "title": s.title,
                "description": s.description,
                "totalPrice": s.total_price(),
                "products": s.products,
            })
        })
        .collect();
    print_json(&json!({ "suggestions": rows }));
    Ok(())
}
