//! Access control for routes.
//!
//! Each navigation is checked against the [`RouteTable`]. The matching rule
//! yields an ordered guard list (authentication, then profile completeness,
//! then role) and the first failing guard decides the outcome:
//!
//! | Failing guard | Decision |
//! |---------------|----------|
//! | authentication | redirect to `/login`, remembering the requested path |
//! | profile (still loading) | [`Decision::Loading`] |
//! | profile (incomplete) | redirect to `/profile/complete`, remembering the path |
//! | role | redirect to `/`, silently |

mod navigation;
mod routes;

pub use navigation::{LoggingNavigator, Navigator};
pub use routes::{Guard, RoutePattern, RouteRule, RouteTable, strip_query};

use crate::session::Session;

/// Home route; role denials land here.
pub const HOME_PATH: &str = "/";

/// Sign-in route.
pub const LOGIN_PATH: &str = "/login";

/// Route where shoppers record their measurements.
pub const PROFILE_COMPLETION_PATH: &str = "/profile/complete";

/// A redirect issued by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Destination.
    pub to: String,
    /// The originally requested location, when the user should be sent back
    /// there afterwards.
    pub from: Option<String>,
}

impl Redirect {
    fn remembering(to: &str, from: &str) -> Self {
        Self {
            to: to.to_string(),
            from: Some(from.to_string()),
        }
    }

    fn silent(to: &str) -> Self {
        Self {
            to: to.to_string(),
            from: None,
        }
    }

    /// Where to go once the redirect target is done with, e.g. after login.
    #[must_use]
    pub fn return_path(&self) -> &str {
        self.from.as_deref().unwrap_or(HOME_PATH)
    }
}

/// Outcome of evaluating a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the route.
    Allow,
    /// The profile is still loading; render a neutral placeholder.
    Loading,
    /// Go elsewhere.
    RedirectTo(Redirect),
}

impl Decision {
    /// Whether the route may be rendered.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The redirect, if any.
    #[must_use]
    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::RedirectTo(redirect) => Some(redirect),
            _ => None,
        }
    }
}

/// What the gate needs to know about the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStatus {
    /// A profile request is in flight.
    pub loading: bool,
    /// Measurements have been recorded.
    pub complete: bool,
}

/// Decide whether `location` may be rendered.
///
/// `location` may carry a query string or fragment; they are ignored for
/// matching and preserved in the remembered `from`.
#[must_use]
pub fn evaluate(
    table: &RouteTable,
    session: &Session,
    profile: ProfileStatus,
    location: &str,
) -> Decision {
    let Some(rule) = table.find(location) else {
        return Decision::Allow;
    };

    for guard in rule.guards() {
        match guard {
            Guard::Authenticated => {
                if !session.is_authenticated() {
                    return Decision::RedirectTo(Redirect::remembering(LOGIN_PATH, location));
                }
            }
            Guard::ProfileComplete => {
                if profile.loading {
                    return Decision::Loading;
                }
                if !profile.complete && !is_profile_completion(location) {
                    return Decision::RedirectTo(Redirect::remembering(
                        PROFILE_COMPLETION_PATH,
                        location,
                    ));
                }
            }
            Guard::Role(allowed) => {
                let permitted = session
                    .user()
                    .is_some_and(|user| allowed.contains(&user.role));
                if !permitted {
                    return Decision::RedirectTo(Redirect::silent(HOME_PATH));
                }
            }
        }
    }

    Decision::Allow
}

fn is_profile_completion(location: &str) -> bool {
    RoutePattern::new(PROFILE_COMPLETION_PATH).matches(location)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use atelier_core::{Email, User, UserId, UserRole};
    use secrecy::SecretString;

    fn signed_in(role: UserRole) -> Session {
        let store = SessionStore::in_memory();
        store.set_credentials(
            User {
                id: UserId::new("u1"),
                email: Email::parse("shopper@atelier.test").unwrap(),
                name: "Shopper".to_string(),
                role,
                profile_complete: false,
                measurements: None,
                avatar: None,
            },
            SecretString::from("tok"),
        );
        store.snapshot()
    }

    const COMPLETE: ProfileStatus = ProfileStatus {
        loading: false,
        complete: true,
    };

    const INCOMPLETE: ProfileStatus = ProfileStatus {
        loading: false,
        complete: false,
    };

    #[test]
    fn test_unauthenticated_cart_redirects_to_login() {
        let decision = evaluate(
            &RouteTable::default_routes(),
            &Session::default(),
            INCOMPLETE,
            "/cart?step=2",
        );
        let redirect = decision.redirect().unwrap();
        assert_eq!(redirect.to, LOGIN_PATH);
        assert_eq!(redirect.return_path(), "/cart?step=2");
    }

    #[test]
    fn test_incomplete_profile_redirects_to_completion() {
        let decision = evaluate(
            &RouteTable::default_routes(),
            &signed_in(UserRole::Consumer),
            INCOMPLETE,
            "/cart",
        );
        assert_eq!(
            decision,
            Decision::RedirectTo(Redirect {
                to: PROFILE_COMPLETION_PATH.to_string(),
                from: Some("/cart".to_string()),
            })
        );
    }

    #[test]
    fn test_case_and_encoding_variants_hit_the_same_guards() {
        let table = RouteTable::default_routes();
        for location in ["/CART", "/c%61rt", "/Cart/?step=2"] {
            let decision = evaluate(&table, &Session::default(), INCOMPLETE, location);
            let redirect = decision.redirect().unwrap();
            assert_eq!(redirect.to, LOGIN_PATH);
            assert_eq!(redirect.return_path(), location);
        }

        let decision = evaluate(&table, &signed_in(UserRole::Consumer), COMPLETE, "/Admin/Dashboard");
        assert_eq!(decision.redirect().unwrap().to, HOME_PATH);
    }

    #[test]
    fn test_loading_profile_is_not_a_redirect() {
        let decision = evaluate(
            &RouteTable::default_routes(),
            &signed_in(UserRole::Consumer),
            ProfileStatus {
                loading: true,
                complete: false,
            },
            "/cart",
        );
        assert_eq!(decision, Decision::Loading);
    }

    #[test]
    fn test_completion_route_never_loops() {
        let table = RouteTable::new().route(
            RouteRule::authenticated(PROFILE_COMPLETION_PATH).with_complete_profile(),
        );
        let decision = evaluate(&table, &signed_in(UserRole::Consumer), INCOMPLETE, "/profile/complete/");
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_role_denial_is_silent() {
        let decision = evaluate(
            &RouteTable::default_routes(),
            &signed_in(UserRole::Consumer),
            COMPLETE,
            "/admin/dashboard",
        );
        assert_eq!(
            decision,
            Decision::RedirectTo(Redirect {
                to: HOME_PATH.to_string(),
                from: None,
            })
        );
        assert_eq!(decision.redirect().unwrap().return_path(), HOME_PATH);
    }

    #[test]
    fn test_authentication_checked_before_role() {
        let decision = evaluate(
            &RouteTable::default_routes(),
            &Session::default(),
            COMPLETE,
            "/admin/dashboard/users",
        );
        assert_eq!(decision.redirect().unwrap().to, LOGIN_PATH);
    }

    #[test]
    fn test_profile_checked_before_role() {
        let table = RouteTable::new().route(
            RouteRule::authenticated("/atelier")
                .with_roles(&[UserRole::Admin])
                .with_complete_profile(),
        );
        let decision = evaluate(&table, &signed_in(UserRole::Consumer), INCOMPLETE, "/atelier");
        assert_eq!(decision.redirect().unwrap().to, PROFILE_COMPLETION_PATH);
    }

    #[test]
    fn test_allowed_roles() {
        let table = RouteTable::default_routes();
        assert!(evaluate(&table, &signed_in(UserRole::Store), INCOMPLETE, "/store/dashboard/orders").is_allowed());
        assert!(evaluate(&table, &signed_in(UserRole::Admin), INCOMPLETE, "/profile").is_allowed());
        assert!(evaluate(&table, &Session::default(), INCOMPLETE, "/products/p9").is_allowed());
        assert!(evaluate(&table, &Session::default(), INCOMPLETE, "/lookbook").is_allowed());
    }
}
