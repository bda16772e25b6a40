//! Admin authorization resolution.

use std::sync::Arc;

use gita_admin_core::Email;
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use crate::error::LoginError;
use crate::principal::{Principal, TokenClaims};
use crate::profile::{AdminProfile, AuthorizationResult};
use crate::provider::AuthProvider;
use crate::store::{Document, DocumentStore};

/// Collection holding legacy admin records, keyed by email.
pub const ADMINS_COLLECTION: &str = "admins";

/// Collection holding app user records with an `email` and `role` field.
pub const USERS_COLLECTION: &str = "users";

/// Advisory attached when authorization came from a legacy admin record.
const LEGACY_RECORD_WARNING: &str =
    "Admin record found in the admins collection; set a custom claim for faster sign-in";

/// Successful interactive login.
#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    /// The resolved admin profile.
    pub profile: AdminProfile,
    /// Operator-facing advice, if any.
    pub warning: Option<String>,
}

/// Resolves whether a principal holds admin privileges.
///
/// One resolver instance serves the whole process; it holds no mutable state
/// and every call is independent. Lookup tiers are strictly sequential and
/// short-circuit on the first verdict:
///
/// 1. token claims (no store round-trip)
/// 2. admin document at the raw email id
/// 3. admin document at the escaped legacy id
/// 4. users-collection query by email field
/// 5. terminal denial (strict) or plain session (permissive)
///
/// Store faults in tiers 2-4 are logged and treated as misses; the resolver
/// never fails a call because the store hiccuped - it answers with the
/// least-privileged outcome instead.
pub struct AdminResolver<P, S> {
    provider: Arc<P>,
    store: Arc<S>,
}

impl<P, S> AdminResolver<P, S>
where
    P: AuthProvider,
    S: DocumentStore,
{
    /// Create a resolver over the given collaborators.
    #[must_use]
    pub const fn new(provider: Arc<P>, store: Arc<S>) -> Self {
        Self { provider, store }
    }

    /// The auth provider collaborator.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Decide whether `principal` holds admin privileges.
    ///
    /// Called once per session-establishment event (sign-in and every
    /// auth-state change or token refresh). With `require_admin` a denial is
    /// terminal: the provider session is signed out before this returns.
    /// Without it, a non-admin principal keeps an authorized session with a
    /// plain profile and no elevated fields.
    #[instrument(skip(self, principal, claims), fields(uid = %principal.uid))]
    pub async fn resolve(
        &self,
        principal: &Principal,
        claims: Option<&TokenClaims>,
        require_admin: bool,
    ) -> AuthorizationResult {
        if principal.uid.is_empty() {
            warn!("principal has no uid; denying");
            if require_admin {
                self.provider.sign_out().await;
            }
            return AuthorizationResult::denied();
        }

        if let Some(verdict) = self.run_tiers(principal, claims).await {
            return verdict;
        }

        if require_admin {
            debug!("no tier matched; signing out");
            self.provider.sign_out().await;
            AuthorizationResult::denied()
        } else {
            debug!("no tier matched; keeping non-admin session");
            AuthorizationResult::granted(AdminProfile::basic(principal))
        }
    }

    /// Exchange credentials for an admin session.
    ///
    /// Runs the same tiers as [`resolve`](Self::resolve), but interactively:
    /// login to the admin surface is always admin-only, so an all-tier denial
    /// signs the fresh session back out instead of leaving a non-admin
    /// session active.
    ///
    /// # Errors
    ///
    /// [`LoginError::InvalidCredentials`] when the provider rejects the
    /// credentials (or cannot be reached), [`LoginError::NotAdmin`] when the
    /// account authenticates but no tier grants admin.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Login, LoginError> {
        let principal = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| LoginError::InvalidCredentials {
                message: e.login_message(),
            })?;

        // Force-refresh so a claim granted since the last sign-in is seen.
        // A claims fetch that fails after a successful exchange is treated as
        // "claims absent" and the document tiers still run.
        let claims = match self.provider.token_claims(&principal, true).await {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!(error = %e, "claims fetch failed after sign-in; continuing without claims");
                None
            }
        };

        if principal.uid.is_empty() {
            self.provider.sign_out().await;
            return Err(LoginError::NotAdmin);
        }

        match self.run_tiers(&principal, claims.as_ref()).await {
            Some(AuthorizationResult {
                profile: Some(profile),
                warning,
                ..
            }) => Ok(Login { profile, warning }),
            _ => {
                self.provider.sign_out().await;
                Err(LoginError::NotAdmin)
            }
        }
    }

    /// Sign the provider session out unconditionally.
    pub async fn logout(&self) {
        self.provider.sign_out().await;
    }

    /// Tiers 1-4. `None` means no tier produced a verdict.
    async fn run_tiers(
        &self,
        principal: &Principal,
        claims: Option<&TokenClaims>,
    ) -> Option<AuthorizationResult> {
        // Tier 1: claims are trusted at face value, no document fetch.
        if claims.is_some_and(TokenClaims::grants_admin) {
            debug!("authorized by token claim");
            return Some(AuthorizationResult::granted(AdminProfile::from_claims(
                principal,
            )));
        }

        let email = principal.email.as_ref()?;

        // Tiers 2-3: admin record under either historical id scheme.
        if let Some(doc) = self.admin_document(email).await {
            if doc.grants_admin() {
                debug!(doc_id = %doc.id, "authorized by admin record");
                return Some(AuthorizationResult::granted_with_warning(
                    AdminProfile::from_document(principal, &doc),
                    LEGACY_RECORD_WARNING.to_owned(),
                ));
            }
            debug!(doc_id = %doc.id, "admin record exists but role does not qualify");
        }

        // Tier 4: role field on the user record.
        if let Some(doc) = self.user_by_email(email).await {
            if doc.grants_admin() {
                debug!(doc_id = %doc.id, "authorized by user record role");
                return Some(AuthorizationResult::granted(AdminProfile::from_document(
                    principal, &doc,
                )));
            }
        }

        None
    }

    /// Fetch the admin record for `email`, trying the raw id first and the
    /// escaped legacy id only when the raw id has no document. Fetch faults
    /// count as misses.
    async fn admin_document(&self, email: &Email) -> Option<Document> {
        match self.store.get_document(ADMINS_COLLECTION, email.as_str()).await {
            Ok(Some(doc)) => return Some(doc),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "admins lookup by raw id failed; treating as miss"),
        }

        match self
            .store
            .get_document(ADMINS_COLLECTION, &email.legacy_doc_id())
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "admins lookup by legacy id failed; treating as miss");
                None
            }
        }
    }

    /// Query the users collection for the record matching `email`.
    async fn user_by_email(&self, email: &Email) -> Option<Document> {
        match self
            .store
            .query_equals(USERS_COLLECTION, "email", email.as_str(), 1)
            .await
        {
            Ok(docs) => docs.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "users lookup failed; treating as miss");
                None
            }
        }
    }
}
