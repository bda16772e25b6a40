//! Resolved admin profile and authorization result.

use gita_admin_core::{AdminRole, Email, Uid};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::principal::Principal;
use crate::store::Document;

/// The resolved, caller-facing representation of an authorized session.
///
/// Constructed fresh on every resolution and replaced wholesale in the
/// session holder. The fixed fields are the allow-list the panel actually
/// reads; any remaining fields of the matched document are carried opaquely
/// in `extra` rather than spread into an untyped shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    /// Provider-issued uid.
    pub uid: Uid,
    /// Email address, if the account has one.
    pub email: Option<Email>,
    /// Display name from the provider, or the matched document's `name`.
    pub name: Option<String>,
    /// Admin role, when resolution matched a qualifying record or claim.
    pub role: Option<AdminRole>,
    /// Remaining fields of the matched document.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl AdminProfile {
    /// A plain profile carrying only provider-asserted identity.
    ///
    /// Used for permissive-mode sessions that hold no elevated fields.
    #[must_use]
    pub fn basic(principal: &Principal) -> Self {
        Self {
            uid: principal.uid.clone(),
            email: principal.email.clone(),
            name: principal.display_name.clone(),
            role: None,
            extra: Map::new(),
        }
    }

    /// Profile for a principal authorized by token claims alone.
    ///
    /// Claims are trusted at face value; no document fields are merged.
    #[must_use]
    pub fn from_claims(principal: &Principal) -> Self {
        Self {
            role: Some(AdminRole::Admin),
            ..Self::basic(principal)
        }
    }

    /// Profile for a principal authorized by a matched document.
    ///
    /// `role` and `name` come from the document when present; identity fields
    /// duplicated in the document (`uid`, `email`) are dropped, and everything
    /// else lands in `extra`.
    #[must_use]
    pub fn from_document(principal: &Principal, doc: &Document) -> Self {
        let mut profile = Self::basic(principal);
        profile.role = doc.role();

        let mut extra = doc.fields.clone();
        extra.remove("role");
        extra.remove("uid");
        extra.remove("email");
        if let Some(Value::String(name)) = extra.remove("name") {
            profile.name = Some(name);
        }
        profile.extra = extra;

        profile
    }
}

/// Outcome of one resolution call.
///
/// `authorized` and `profile` move together except in permissive mode, where
/// a non-admin session is authorized with a plain profile. A profile with a
/// populated `role` is only ever produced for a principal whose admin check
/// succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationResult {
    /// Whether the session may exist at all.
    pub authorized: bool,
    /// The session profile, when one is permitted.
    pub profile: Option<AdminProfile>,
    /// Operator-facing advice (e.g. migrate a legacy record to a claim).
    pub warning: Option<String>,
}

impl AuthorizationResult {
    /// An authorized result with a profile.
    #[must_use]
    pub const fn granted(profile: AdminProfile) -> Self {
        Self {
            authorized: true,
            profile: Some(profile),
            warning: None,
        }
    }

    /// An authorized result with a profile and an advisory warning.
    #[must_use]
    pub const fn granted_with_warning(profile: AdminProfile, warning: String) -> Self {
        Self {
            authorized: true,
            profile: Some(profile),
            warning: Some(warning),
        }
    }

    /// A terminal denial.
    #[must_use]
    pub const fn denied() -> Self {
        Self {
            authorized: false,
            profile: None,
            warning: None,
        }
    }
}
