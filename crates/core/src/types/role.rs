//! Admin role levels.

use serde::{Deserialize, Serialize};

/// Admin role with different permission levels.
///
/// Only these two roles grant access to the admin panel. Documents may carry
/// other `role` strings (e.g. `"user"` in the users collection); those fail to
/// parse and are treated as non-admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin-account management.
    SuperAdmin,
    /// Full access to content management (shloks, videos, users).
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("not an admin role: {s}")),
        }
    }
}
