//! The session store: who is signed in, and with which token.
//!
//! The session is a single versioned record. User and token live together
//! inside one `Option`, so one is never present without the other. Every
//! change goes through [`SessionStore`], which persists it and publishes it
//! on a `watch` channel for observers.

pub mod storage;

use std::sync::Arc;

use atelier_core::User;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use storage::{CredentialStorage, MemoryStorage, SESSION_TTL, keys};

/// An authenticated identity: the user and the bearer token issued for them.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub token: SecretString,
}

/// Current session state.
///
/// `version` increases by one on every transition, so observers can tell
/// a re-login apart from an unchanged session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    version: u64,
}

impl Session {
    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.identity.as_ref().map(|i| &i.token)
    }

    /// Transition counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

/// Owner of the session record.
///
/// Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    state: watch::Sender<Session>,
    storage: Arc<dyn CredentialStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Restore the session from storage.
    ///
    /// A session is established only when both the token and a parseable
    /// user are stored. Any other combination, or a storage failure, purges
    /// what is stored and starts signed out.
    #[must_use]
    pub fn hydrate(storage: Arc<dyn CredentialStorage>) -> Self {
        let identity = match (storage.get(keys::TOKEN), storage.get(keys::USER)) {
            (Ok(None), Ok(None)) => None,
            (Ok(Some(token)), Ok(Some(raw_user))) if !token.trim().is_empty() => {
                match serde_json::from_str::<User>(&raw_user) {
                    Ok(user) => Some(Identity {
                        user,
                        token: SecretString::from(token),
                    }),
                    Err(e) => {
                        warn!(error = %e, "Stored user is unreadable, discarding session");
                        purge(storage.as_ref());
                        None
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Session storage unreadable, discarding session");
                purge(storage.as_ref());
                None
            }
            _ => {
                warn!("Stored session is incomplete, discarding it");
                purge(storage.as_ref());
                None
            }
        };

        if let Some(identity) = &identity {
            info!(user_id = %identity.user.id, "Session restored");
            set_sentry_user(&identity.user.id, Some(identity.user.email.as_str()));
        }

        let (state, _) = watch::channel(Session {
            identity,
            version: 0,
        });
        Self {
            inner: Arc::new(SessionStoreInner { state, storage }),
        }
    }

    /// A signed-out session that persists nothing beyond this process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::hydrate(Arc::new(MemoryStorage::new()))
    }

    /// Replace the session with `user` and `token` and persist both.
    ///
    /// The in-memory session is updated even if persisting fails.
    pub fn set_credentials(&self, user: User, token: SecretString) {
        self.persist(&user, &token);
        set_sentry_user(&user.id, Some(user.email.as_str()));
        info!(user_id = %user.id, role = %user.role, "Session established");

        self.inner.state.send_modify(|session| {
            session.identity = Some(Identity { user, token });
            session.version += 1;
        });
    }

    /// End the session and remove it from storage.
    ///
    /// Clearing a signed-out session leaves the version unchanged.
    pub fn clear(&self) {
        let cleared = self.inner.state.send_if_modified(|session| {
            if session.identity.take().is_some() {
                session.version += 1;
                true
            } else {
                false
            }
        });
        purge(self.inner.storage.as_ref());

        if cleared {
            clear_sentry_user();
            info!("Session cleared");
        }
    }

    /// Whether a token is present. No network access.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.state.borrow().token().cloned()
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Observe session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    fn persist(&self, user: &User, token: &SecretString) {
        let storage = self.inner.storage.as_ref();
        let raw_user = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize user for storage");
                return;
            }
        };
        let result = storage
            .set(keys::TOKEN, token.expose_secret(), SESSION_TTL)
            .and_then(|()| storage.set(keys::USER, &raw_user, SESSION_TTL));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }
}

fn purge(storage: &dyn CredentialStorage) {
    for key in [keys::TOKEN, keys::USER] {
        if let Err(e) = storage.remove(key) {
            warn!(key, error = %e, "Failed to remove stored session entry");
        }
    }
}
