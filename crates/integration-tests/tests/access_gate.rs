//! Integration tests for the access gate.
//!
//! Decisions are taken through [`Store`], so the session and the profile
//! slice feed the gate the same way they do in the app.

use atelier_client::testing::{RecordingNavigator, sample_user, user_with_role};
use atelier_client::{Decision, Lifecycle};
use atelier_core::{Measurements, UserRole};
use atelier_integration_tests::Harness;
use serde_json::json;

fn measurements() -> Measurements {
    Measurements {
        height: 170.0,
        weight: 65.0,
        chest: 90.0,
        waist: 75.0,
        hips: 95.0,
        inseam: 80.0,
        shoulder: None,
    }
}

// =============================================================================
// Guard Stages
// =============================================================================

#[test]
fn test_unauthenticated_cart_redirects_to_login() {
    let h = Harness::signed_out();

    let Decision::RedirectTo(redirect) = h.store.evaluate("/cart") else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.to, "/login");
    assert_eq!(redirect.from.as_deref(), Some("/cart"));
    assert_eq!(redirect.return_path(), "/cart");
}

#[test]
fn test_incomplete_profile_redirects_to_completion_not_login() {
    let h = Harness::signed_in(sample_user());

    let Decision::RedirectTo(redirect) = h.store.evaluate("/cart") else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.to, "/profile/complete");
    assert_eq!(redirect.from.as_deref(), Some("/cart"));
}

#[test]
fn test_completion_page_renders_for_incomplete_profile() {
    let h = Harness::signed_in(sample_user());
    assert_eq!(h.store.evaluate("/profile/complete"), Decision::Allow);
}

#[test]
fn test_consumer_on_admin_dashboard_goes_home() {
    let h = Harness::signed_in(user_with_role(UserRole::Consumer, true));

    let Decision::RedirectTo(redirect) = h.store.evaluate("/admin/dashboard") else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.to, "/");
    assert_eq!(redirect.from, None);
}

#[test]
fn test_path_spelling_does_not_bypass_guards() {
    let h = Harness::signed_out();
    for location in ["/CART", "/c%61rt", "/%63art?step=2"] {
        let Decision::RedirectTo(redirect) = h.store.evaluate(location) else {
            panic!("expected a redirect for {location}");
        };
        assert_eq!(redirect.to, "/login");
        assert_eq!(redirect.from.as_deref(), Some(location));
    }

    let consumer = Harness::signed_in(user_with_role(UserRole::Consumer, true));
    for location in ["/Admin/Dashboard", "/admin/%64ashboard/users"] {
        let decision = consumer.store.evaluate(location);
        assert_eq!(decision.redirect().map(|r| r.to.as_str()), Some("/"));
    }
}

#[test]
fn test_roles_reach_their_own_dashboards() {
    let admin = Harness::signed_in(user_with_role(UserRole::Admin, true));
    assert_eq!(admin.store.evaluate("/admin/dashboard/orders"), Decision::Allow);
    assert!(!admin.store.evaluate("/store/dashboard").is_allowed());

    let store = Harness::signed_in(user_with_role(UserRole::Store, true));
    assert_eq!(store.store.evaluate("/store/dashboard"), Decision::Allow);
    assert!(!store.store.evaluate("/admin/dashboard").is_allowed());
}

#[test]
fn test_public_routes_need_nothing() {
    let h = Harness::signed_out();
    for path in ["/", "/products", "/products/p-1?ref=home", "/login", "/register"] {
        assert_eq!(h.store.evaluate(path), Decision::Allow, "{path}");
    }
}

// =============================================================================
// State Changes
// =============================================================================

#[tokio::test]
async fn test_saving_measurements_unlocks_cart() {
    let h = Harness::signed_in(sample_user());
    h.backend.respond("submit_measurements", json!(measurements()));

    assert!(!h.store.evaluate("/cart").is_allowed());
    let outcome = h
        .store
        .profile()
        .update_measurements(&h.backend, measurements())
        .await;

    assert_eq!(outcome, Lifecycle::Fulfilled);
    assert_eq!(h.store.evaluate("/cart"), Decision::Allow);
}

#[tokio::test]
async fn test_profile_request_in_flight_reports_loading() {
    let h = Harness::signed_in(sample_user());
    h.backend.respond("submit_measurements", json!(measurements()));

    let profile = h.store.profile();
    let pending = profile.update_measurements(&h.backend, measurements());
    tokio::pin!(pending);

    // The scripted backend yields once, leaving the request pending.
    assert!(poll_once(pending.as_mut()).await.is_none());
    assert_eq!(h.store.evaluate("/cart"), Decision::Loading);

    assert_eq!(pending.await, Lifecycle::Fulfilled);
    assert_eq!(h.store.evaluate("/cart"), Decision::Allow);
}

#[tokio::test]
async fn test_logout_closes_protected_routes() {
    let h = Harness::signed_in(user_with_role(UserRole::Consumer, true));
    h.backend.respond("logout", json!(null));
    assert_eq!(h.store.evaluate("/cart"), Decision::Allow);

    h.store.logout(&h.backend).await;

    let Decision::RedirectTo(redirect) = h.store.evaluate("/cart") else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.to, "/login");
}

#[test]
fn test_navigate_follows_the_decision() {
    let h = Harness::signed_out();
    let navigator = RecordingNavigator::default();

    h.store.navigate("/products", &navigator);
    h.store.navigate("/cart?step=2", &navigator);

    assert_eq!(navigator.visited(), vec!["/products", "/login"]);
}

/// Poll `future` once. `Some` if it completed.
async fn poll_once<F: std::future::Future + Unpin>(future: F) -> Option<F::Output> {
    let mut future = future;
    std::future::poll_fn(|cx| {
        std::task::Poll::Ready(match std::pin::Pin::new(&mut future).poll(cx) {
            std::task::Poll::Ready(output) => Some(output),
            std::task::Poll::Pending => None,
        })
    })
    .await
}
