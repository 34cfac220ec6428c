//! Route patterns and the access rules attached to them.

use std::borrow::Cow;

use atelier_core::UserRole;

use super::{HOME_PATH, LOGIN_PATH, PROFILE_COMPLETION_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// A path pattern such as `/products/:id` or `/store/dashboard/*`.
///
/// `:name` matches exactly one segment. A trailing `*` matches zero or more
/// segments. Trailing slashes are ignored on both sides. Path segments are
/// percent-decoded and compared to literals without regard to ASCII case, the
/// same way the router resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    wildcard: bool,
}

impl RoutePattern {
    /// Parse a pattern. A `*` anywhere but the last segment is matched
    /// literally.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let mut parts: Vec<&str> = split_segments(pattern).collect();
        let wildcard = parts.last() == Some(&"*");
        if wildcard {
            parts.pop();
        }

        let segments = parts
            .into_iter()
            .map(|part| {
                if part.starts_with(':') {
                    Segment::Param
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
            wildcard,
        }
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `path` matches. Query string and fragment are ignored.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_segments(strip_query(path));

        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Literal(expected), Some(part))
                    if decode_segment(part).eq_ignore_ascii_case(expected) => {}
                (Segment::Param, Some(_)) => {}
                _ => return false,
            }
        }

        self.wildcard || parts.next().is_none()
    }
}

/// The path portion of a location, without query string or fragment.
#[must_use]
pub fn strip_query(location: &str) -> &str {
    location
        .split_once(['?', '#'])
        .map_or(location, |(path, _)| path)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(segment.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(segment),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// One layer of the access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// A session must be present.
    Authenticated,
    /// The profile must be loaded and complete.
    ProfileComplete,
    /// The user's role must be one of these.
    Role(Vec<UserRole>),
}

/// Access requirements for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pattern: RoutePattern,
    profile: bool,
    roles: Option<Vec<UserRole>>,
    auth: bool,
}

impl RouteRule {
    /// A route anyone may visit.
    #[must_use]
    pub fn public(pattern: &str) -> Self {
        Self {
            pattern: RoutePattern::new(pattern),
            profile: false,
            roles: None,
            auth: false,
        }
    }

    /// A route that needs a signed-in user.
    #[must_use]
    pub fn authenticated(pattern: &str) -> Self {
        Self {
            auth: true,
            ..Self::public(pattern)
        }
    }

    /// Also require a complete profile.
    #[must_use]
    pub const fn with_complete_profile(mut self) -> Self {
        self.auth = true;
        self.profile = true;
        self
    }

    /// Also require one of `roles`.
    #[must_use]
    pub fn with_roles(mut self, roles: &[UserRole]) -> Self {
        self.auth = true;
        self.roles = Some(roles.to_vec());
        self
    }

    /// The route's path pattern.
    #[must_use]
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Whether any guard applies.
    #[must_use]
    pub const fn is_guarded(&self) -> bool {
        self.auth
    }

    /// The guards for this route, always ordered authentication, profile,
    /// role regardless of how the rule was built.
    #[must_use]
    pub fn guards(&self) -> Vec<Guard> {
        let mut guards = Vec::with_capacity(3);
        if self.auth {
            guards.push(Guard::Authenticated);
        }
        if self.profile {
            guards.push(Guard::ProfileComplete);
        }
        if let Some(roles) = &self.roles {
            guards.push(Guard::Role(roles.clone()));
        }
        guards
    }
}

/// Ordered list of route rules. The first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// An empty table: every path is public.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    #[must_use]
    pub fn route(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The storefront's route surface.
    #[must_use]
    pub fn default_routes() -> Self {
        Self::new()
            .route(RouteRule::public(HOME_PATH))
            .route(RouteRule::public("/products"))
            .route(RouteRule::public("/products/:id"))
            .route(RouteRule::public(LOGIN_PATH))
            .route(RouteRule::public("/register"))
            .route(RouteRule::public(PROFILE_COMPLETION_PATH))
            .route(RouteRule::authenticated("/cart").with_complete_profile())
            .route(RouteRule::authenticated("/profile").with_roles(&[
                UserRole::Consumer,
                UserRole::Store,
                UserRole::Admin,
            ]))
            .route(RouteRule::authenticated("/store/dashboard/*").with_roles(&[UserRole::Store]))
            .route(RouteRule::authenticated("/admin/dashboard/*").with_roles(&[UserRole::Admin]))
    }

    /// The rule governing `path`, if any.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }
}
