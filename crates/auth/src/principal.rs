//! Principal and token-claim input types.

use gita_admin_core::{Email, Uid};
use serde::{Deserialize, Serialize};

/// An authenticated identity asserted by the auth provider.
///
/// Immutable for the lifetime of one resolution call. The email may be absent
/// (phone-number accounts exist in the users collection); lookups keyed by
/// email then simply fail to match rather than error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-issued uid.
    pub uid: Uid,
    /// Email address, if the account has one.
    pub email: Option<Email>,
    /// Display name, if the account has one.
    pub display_name: Option<String>,
}

/// Custom claims read from a principal's ID token.
///
/// Absent claims mean "unknown", not "not admin" - resolution falls through
/// to the document tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The `role` custom claim, if set.
    pub role: Option<String>,
    /// The `admin` custom claim, if set.
    pub admin: Option<bool>,
}

impl TokenClaims {
    /// Whether the claims grant admin access on their own.
    ///
    /// Matches the panel's historical claim check exactly: the `role` claim
    /// must be the string `"admin"` (a `super_admin` claim was never issued)
    /// or the boolean `admin` claim must be true.
    #[must_use]
    pub fn grants_admin(&self) -> bool {
        self.role.as_deref() == Some("admin") || self.admin == Some(true)
    }
}
