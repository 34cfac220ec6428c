//! Account access: register, sign in, sign out.

use atelier_client::api::{GoogleLoginRequest, RegisterRequest};
use atelier_core::{Email, UserRole};
use secrecy::SecretString;
use serde_json::json;

use super::{CliError, Context, print_json, settled};

pub async fn register(
    ctx: &Context,
    name: String,
    email: Email,
    password: String,
    confirm: String,
    role: UserRole,
) -> Result<(), CliError> {
    let request = RegisterRequest {
        name,
        email,
        password: SecretString::from(password),
        role,
    };
    let outcome = ctx
        .store
        .register(&ctx.api, request, &SecretString::from(confirm))
        .await;
    settled("register", outcome, ctx.store.auth().snapshot().error())?;
    print_signed_in(ctx);
    Ok(())
}

pub async fn login_google(
    ctx: &Context,
    token: String,
    role: Option<UserRole>,
) -> Result<(), CliError> {
    let request = GoogleLoginRequest {
        token: SecretString::from(token),
        role,
    };
    let outcome = ctx.store.login_with_google(&ctx.api, request).await;
    settled("login", outcome, ctx.store.auth().snapshot().error())?;
    print_signed_in(ctx);
    Ok(())
}

/// Sign out. The local session is gone even if the backend call failed, so
/// a failure is only reported.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    let outcome = ctx.store.logout(&ctx.api).await;
    if let Err(e) = settled("logout", outcome, ctx.store.auth().snapshot().error()) {
        tracing::warn!("Signed out locally; {e}");
    } else {
        tracing::info!("Signed out");
    }
    Ok(())
}

fn print_signed_in(ctx: &Context) {
    if let Some(user) = ctx.store.session().user() {
        tracing::info!(user_id = %user.id, "Signed in");
        print_json(&json!({ "user": user }));
    }
}
