//! Command implementations.
//!
//! Every command hydrates the session from `ATELIER_SESSION_FILE`, builds
//! an [`ApiClient`] and a [`Store`] over it, and reports through `tracing`
//! plus JSON on stdout.

pub mod assistant;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod route;
pub mod session;

use std::sync::Arc;

use atelier_client::gate::LoggingNavigator;
use atelier_client::session::storage::FileStorage;
use atelier_client::{ApiClient, ClientConfig, ClientError, Lifecycle, SessionStore, Store};
use serde_json::Value;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An operation settled as rejected.
    #[error("{op} failed: {message}")]
    Rejected { op: &'static str, message: String },

    /// The backend rejected the session; it has been cleared.
    #[error("{0} requires signing in again")]
    SignedOut(&'static str),
}

/// Everything a command needs.
pub struct Context {
    pub api: ApiClient,
    pub store: Store,
}

impl Context {
    pub fn new(config: &ClientConfig) -> Result<Self, CliError> {
        let storage = Arc::new(FileStorage::new(&config.session_file));
        let session = SessionStore::hydrate(storage);
        let api = ApiClient::new(config, session.clone(), Arc::new(LoggingNavigator))?;
        let store = Store::new(session);
        Ok(Self { api, store })
    }
}

/// Turn a settled lifecycle into a command result.
pub fn settled(op: &'static str, outcome: Lifecycle, error: Option<&str>) -> Result<(), CliError> {
    match outcome {
        Lifecycle::Rejected => Err(CliError::Rejected {
            op,
            message: error.unwrap_or("unknown error").to_string(),
        }),
        Lifecycle::Idle => Err(CliError::SignedOut(op)),
        Lifecycle::Fulfilled | Lifecycle::Pending => Ok(()),
    }
}

/// Write a JSON document to stdout.
#[allow(clippy::print_stdout)]
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Failed to render output: {e}"),
    }
}
