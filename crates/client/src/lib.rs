//! Atelier storefront client core.
//!
//! This crate holds the state-and-guard core of the storefront client:
//!
//! - [`session`] - Persisted identity (token + user) with hydrate/set/clear
//! - [`api`] - The remote access client and its 401 interceptor
//! - [`store`] - Async resource slices (cart, profile, ai, wishlist, orders, ...)
//! - [`gate`] - Route guards: authentication, profile completeness, role
//!
//! Presentation is an external collaborator: views read slice snapshots,
//! dispatch slice operations, and ask the gate what to render.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_client::{ApiClient, ClientConfig, SessionStore, Store};
//!
//! let config = ClientConfig::from_env()?;
//! let session = SessionStore::hydrate(Arc::new(FileStorage::new(&config.session_file)));
//! let api = ApiClient::new(&config, session.clone(), navigator)?;
//! let store = Store::new(session);
//!
//! store.cart().fetch(&api).await;
//! match store.evaluate("/cart") { ... }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{ApiClient, Backend};
pub use config::ClientConfig;
pub use error::ClientError;
pub use gate::{Decision, Navigator, Redirect};
pub use session::{Session, SessionStore};
pub use store::{AsyncResource, Lifecycle, Store};
