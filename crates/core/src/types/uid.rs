//! Principal uid newtype.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An auth-provider uid (Firebase `localId`).
///
/// Uids are opaque strings minted by the auth provider; this wrapper prevents
/// mixing them up with emails or document ids. An empty uid is representable
/// (the provider contract does not guarantee one) and is checked with
/// [`Uid::is_empty`] where it matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap a provider-issued uid.
    #[must_use]
    pub const fn new(uid: String) -> Self {
        Self(uid)
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the uid is empty (an unusable principal).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Uid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl From<&str> for Uid {
    fn from(uid: &str) -> Self {
        Self(uid.to_owned())
    }
}
