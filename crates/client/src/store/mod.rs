//! Application state: one slice per feature, plus the session.
//!
//! Slices are independent. Each owns its data exclusively and none writes to
//! another. [`Store`] wires them to the session for the flows that span
//! several of them (sign-in seeds the profile, sign-out resets everything the
//! user owned) and evaluates the access gate against current state.
//!
//! The session can also end without the store's involvement, when a 401
//! clears it mid-request. Every accessor for user-owned state first checks
//! whose data the slices hold and drops it once that user is gone.

mod ai;
mod auth;
mod cart;
mod catalog;
mod orders;
mod profile;
mod resource;
mod ui;
mod wishlist;

pub use ai::{AiSlice, Assistant};
pub use auth::AuthSlice;
pub use cart::CartSlice;
pub use catalog::{Catalog, CatalogSlice};
pub use orders::{Orders, OrdersSlice};
pub use profile::{Profile, ProfileSlice};
pub use resource::{AsyncResource, Lifecycle, Slice};
pub use ui::{Toast, ToastKind, UiSlice, UiState};
pub use wishlist::WishlistSlice;

use std::sync::{Arc, Mutex, PoisonError};

use atelier_core::UserId;
use secrecy::SecretString;
use tracing::debug;

use crate::api::{Backend, GoogleLoginRequest, RegisterRequest};
use crate::gate::{self, Decision, Navigator, RouteTable};
use crate::session::SessionStore;

/// Every slice, the session, and the route table.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    session: SessionStore,
    routes: RouteTable,
    auth: AuthSlice,
    cart: CartSlice,
    profile: ProfileSlice,
    ai: AiSlice,
    wishlist: WishlistSlice,
    orders: OrdersSlice,
    catalog: CatalogSlice,
    ui: UiSlice,
    /// The user whose data the user-owned slices hold.
    owner: Mutex<Option<UserId>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// A store over `session` with the storefront's routes. The profile is
    /// seeded from the session user, if any.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self::with_routes(session, RouteTable::default_routes())
    }

    #[must_use]
    pub fn with_routes(session: SessionStore, routes: RouteTable) -> Self {
        let profile = ProfileSlice::default();
        let user = session.user();
        if let Some(user) = &user {
            profile.seed(user);
        }

        Self {
            inner: Arc::new(StoreInner {
                session,
                routes,
                auth: AuthSlice::default(),
                cart: CartSlice::default(),
                profile,
                ai: AiSlice::default(),
                wishlist: WishlistSlice::default(),
                orders: OrdersSlice::default(),
                catalog: CatalogSlice::default(),
                ui: UiSlice::default(),
                owner: Mutex::new(user.map(|u| u.id)),
            }),
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    #[must_use]
    pub fn auth(&self) -> &AuthSlice {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartSlice {
        self.sync_owner();
        &self.inner.cart
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileSlice {
        self.sync_owner();
        &self.inner.profile
    }

    #[must_use]
    pub fn ai(&self) -> &AiSlice {
        self.sync_owner();
        &self.inner.ai
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistSlice {
        self.sync_owner();
        &self.inner.wishlist
    }

    #[must_use]
    pub fn orders(&self) -> &OrdersSlice {
        self.sync_owner();
        &self.inner.orders
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogSlice {
        &self.inner.catalog
    }

    #[must_use]
    pub fn ui(&self) -> &UiSlice {
        &self.inner.ui
    }

    /// Create an account and sign in. `confirm_password` must match the
    /// request's password.
    pub async fn register(
        &self,
        backend: &impl Backend,
        request: RegisterRequest,
        confirm_password: &SecretString,
    ) -> Lifecycle {
        self.inner
            .auth
            .register(
                backend,
                &self.inner.session,
                &self.inner.profile,
                request,
                confirm_password,
            )
            .await
    }

    pub async fn login_with_google(
        &self,
        backend: &impl Backend,
        request: GoogleLoginRequest,
    ) -> Lifecycle {
        self.inner
            .auth
            .login_with_google(backend, &self.inner.session, &self.inner.profile, request)
            .await
    }

    /// Sign out and forget everything the user owned. Local state is
    /// cleared whatever the backend answers.
    pub async fn logout(&self, backend: &impl Backend) -> Lifecycle {
        let outcome = self.inner.auth.logout(backend, &self.inner.session).await;
        self.reset_user_state();
        outcome
    }

    /// Reset every slice holding user data: cart, profile, assistant,
    /// wishlist and orders.
    pub fn reset_user_state(&self) {
        self.inner.cart.reset();
        self.inner.profile.reset();
        self.inner.ai.reset();
        self.inner.wishlist.reset();
        self.inner.orders.reset();
    }

    /// Drop user-owned data if the session user changed since it was loaded,
    /// and seed the profile for the new user, if any.
    fn sync_owner(&self) {
        let user = self.inner.session.user();
        let current = user.as_ref().map(|u| u.id.clone());
        let mut owner = self
            .inner
            .owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *owner == current {
            return;
        }

        if owner.is_some() {
            debug!(
                previous = ?*owner,
                current = ?current,
                "Session user changed, resetting user state"
            );
            self.reset_user_state();
        }
        if let Some(user) = &user {
            self.inner.profile.seed(user);
        }
        *owner = current;
    }

    /// Ask the gate whether `location` may be rendered now.
    #[must_use]
    pub fn evaluate(&self, location: &str) -> Decision {
        self.sync_owner();
        let session = self.inner.session.snapshot();
        gate::evaluate(
            &self.inner.routes,
            &session,
            self.inner.profile.status(),
            location,
        )
    }

    /// Evaluate `location` and move there, or to wherever the gate
    /// redirects. A loading decision navigates nowhere.
    pub fn navigate(&self, location: &str, navigator: &dyn Navigator) -> Decision {
        let decision = self.evaluate(location);
        debug!(location, decision = ?decision, "Route evaluated");
        match &decision {
            Decision::Allow => navigator.navigate(location),
            Decision::RedirectTo(redirect) => navigator.navigate(&redirect.to),
            Decision::Loading => {}
        }
        decision
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::{LOGIN_PATH, PROFILE_COMPLETION_PATH};
    use crate::testing::{RecordingNavigator, ScriptedBackend, cart_line, sample_user, user_with_role};
    use atelier_core::{ProductId, UserRole};
    use serde_json::json;

    #[test]
    fn test_new_seeds_profile_from_session() {
        let session = SessionStore::in_memory();
        session.set_credentials(user_with_role(UserRole::Consumer, true), SecretString::from("tok"));

        let store = Store::new(session);
        assert!(store.profile().status().complete);
        assert!(store.evaluate("/cart").is_allowed());
    }

    #[test]
    fn test_navigate_follows_redirect() {
        let store = Store::new(SessionStore::in_memory());
        let navigator = RecordingNavigator::default();

        let decision = store.navigate("/cart", &navigator);
        assert_eq!(decision.redirect().unwrap().to, LOGIN_PATH);
        store.navigate("/products", &navigator);
        assert_eq!(navigator.visited(), vec![LOGIN_PATH.to_string(), "/products".to_string()]);
    }

    #[test]
    fn test_gate_reevaluates_after_profile_changes() {
        let session = SessionStore::in_memory();
        session.set_credentials(sample_user(), SecretString::from("tok"));
        let store = Store::new(session);

        assert_eq!(
            store.evaluate("/cart").redirect().map(|r| r.to.as_str()),
            Some(PROFILE_COMPLETION_PATH)
        );

        let mut user = sample_user();
        user.profile_complete = true;
        store.profile().seed(&user);
        assert!(store.evaluate("/cart").is_allowed());
    }

    #[tokio::test]
    async fn test_unauthorized_response_drops_user_data() {
        let session = SessionStore::in_memory();
        session.set_credentials(user_with_role(UserRole::Consumer, true), SecretString::from("tok"));
        let navigator = Arc::new(RecordingNavigator::default());
        let backend = ScriptedBackend::with_session(session.clone(), navigator.clone());
        let store = Store::new(session);

        backend.respond("fetch_cart", json!([cart_line("l1", "p1", 2)]));
        store.cart().fetch(&backend).await;
        store.wishlist().add(ProductId::new("p1"));
        assert_eq!(store.cart().items().len(), 1);

        backend.fail("chat", 401, None);
        assert_eq!(store.ai().send_message(&backend, "Hi").await, Lifecycle::Idle);

        assert!(store.cart().items().is_empty());
        assert!(store.wishlist().items().is_empty());
        assert!(!store.profile().status().complete);
        assert_eq!(navigator.visited(), vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn test_switching_accounts_replaces_user_data() {
        let session = SessionStore::in_memory();
        session.set_credentials(user_with_role(UserRole::Store, true), SecretString::from("a"));
        let store = Store::new(session.clone());
        store.wishlist().add(ProductId::new("p1"));

        session.set_credentials(sample_user(), SecretString::from("b"));

        assert!(store.wishlist().items().is_empty());
        assert!(!store.profile().status().complete);
        assert_eq!(
            store.evaluate("/cart").redirect().map(|r| r.to.as_str()),
            Some(PROFILE_COMPLETION_PATH)
        );
    }

    #[tokio::test]
    async fn test_logout_resets_user_slices() {
        let session = SessionStore::in_memory();
        session.set_credentials(sample_user(), SecretString::from("tok"));
        let store = Store::new(session);

        let backend = ScriptedBackend::new();
        backend.respond("fetch_cart", json!([cart_line("l1", "p1", 1)]));
        backend.respond("logout", json!(null));

        store.cart().fetch(&backend).await;
        store.wishlist().add(ProductId::new("p1"));
        store.ui().toggle_dark_mode();

        assert_eq!(store.logout(&backend).await, Lifecycle::Fulfilled);
        assert!(!store.session().is_authenticated());
        assert!(store.cart().items().is_empty());
        assert!(store.wishlist().items().is_empty());
        assert!(store.ui().snapshot().dark_mode);
    }
}
