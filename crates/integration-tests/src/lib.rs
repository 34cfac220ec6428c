//! Integration tests for Atelier.
//!
//! These drive the client core end to end: a [`Store`] over a real
//! [`SessionStore`], with a [`ScriptedBackend`] standing in for the remote
//! API. Nothing here touches the network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `access_gate` - Route decisions for every guard stage
//! - `session_persistence` - File-backed sessions across restarts
//! - `slices` - Request lifecycles and the 401 interceptor

use std::sync::Arc;

use atelier_client::testing::{RecordingNavigator, ScriptedBackend};
use atelier_client::{SessionStore, Store};
use atelier_core::User;
use secrecy::SecretString;

/// A store, the backend it talks to, and where that backend navigates on 401.
pub struct Harness {
    pub store: Store,
    pub backend: ScriptedBackend,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    /// A signed-out harness over an in-memory session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::over(SessionStore::in_memory())
    }

    /// A harness whose session already holds `user`.
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        let session = SessionStore::in_memory();
        session.set_credentials(user, SecretString::from("test-token"));
        Self::over(session)
    }

    /// A harness over an existing session.
    #[must_use]
    pub fn over(session: SessionStore) -> Self {
        let navigator = Arc::new(RecordingNavigator::default());
        let backend = ScriptedBackend::with_session(session.clone(), navigator.clone());
        let store = Store::new(session);
        Self {
            store,
            backend,
            navigator,
        }
    }
}
