//! Unified error handling with Sentry integration.
//!
//! Every backend operation returns `Result<T, ClientError>`. Slices never
//! surface these errors directly: they store [`ClientError::user_message`] in
//! their `error` field, preferring the server's message and falling back to a
//! fixed per-operation message.

use serde::Deserialize;
use thiserror::Error;

/// Errors produced by the remote access client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed (connection, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 401. The session has already been cleared and
    /// the login redirect issued by the interceptor.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, if the body carried one.
        message: Option<String>,
    },

    /// A response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The request was rejected locally before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Human-readable message for slice state.
    ///
    /// Server-supplied and local validation messages are returned verbatim;
    /// everything else collapses to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::InvalidInput(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether this error is the intercepted 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Error body returned by the backend: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error message.
    pub message: Option<String>,
}

/// Extract the server message from an error response body.
///
/// Bodies that are not JSON, or JSON without a string `message`, yield
/// `None`.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// Set the Sentry user context.
///
/// Call this after credentials are established to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this when the session ends to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a dispatched operation.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_item rejected", Some(&[("generation", "4")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
