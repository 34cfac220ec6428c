//! Session inspection.

use serde_json::json;

use super::{CliError, Context, print_json};

/// Print the signed-in user, if any.
pub fn show(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.store.session();
    match session.user() {
        Some(user) => print_json(&json!({ "authenticated": true, "user": user })),
        None => print_json(&json!({ "authenticated": false })),
    }
    Ok(())
}

/// Drop the persisted session without contacting the backend.
pub fn clear(ctx: &Context) -> Result<(), CliError> {
    ctx.store.session().clear();
    tracing::info!("Local session removed");
    Ok(())
}
