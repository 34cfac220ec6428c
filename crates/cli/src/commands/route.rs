//! Access gate evaluation.

use atelier_client::Decision;
use atelier_client::gate::LoggingNavigator;
use serde_json::json;

use super::{Context, print_json};

/// Print what the app would do when asked to show `path`.
pub fn evaluate(ctx: &Context, path: &str) {
    let decision = ctx.store.navigate(path, &LoggingNavigator);
    let output = match decision {
        Decision::Allow => json!({ "path": path, "decision": "allow" }),
        Decision::Loading => json!({ "path": path, "decision": "loading" }),
        Decision::RedirectTo(redirect) => json!({
            "path": path,
            "decision": "redirect",
            "to": redirect.to,
            "returnTo": redirect.return_path(),
        }),
    };
    print_json(&output);
}
