//! Account roles.

use serde::{Deserialize, Serialize};

/// Role attached to every account.
///
/// Roles drive the access gate: dashboards are restricted to `Store` and
/// `Admin`, while `Consumer` accounts shop and manage their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Merchant operating a store on the platform.
    Store,
    /// Shopper.
    Consumer,
}

impl UserRole {
    /// Every role, in privilege order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Store, Self::Consumer];

    /// The lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Store => "store",
            Self::Consumer => "consumer",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "store" => Ok(Self::Store),
            "consumer" => Ok(Self::Consumer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
