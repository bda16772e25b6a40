//! Session-state holder.
//!
//! The panel originally kept the signed-in admin in a module-level singleton;
//! here the session is an explicit object owning the current profile, with
//! the resolver injected so tests can drive it with fake collaborators.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::SecretString;
use tracing::warn;

use crate::error::LoginError;
use crate::principal::Principal;
use crate::profile::AdminProfile;
use crate::provider::AuthProvider;
use crate::resolver::{AdminResolver, Login};
use crate::store::DocumentStore;

/// Owns the current session's [`AdminProfile`] and serializes updates to it.
///
/// Each resolution is tagged with a monotonic generation; a resolution that
/// completes after a newer auth-state event has been observed is discarded,
/// so a stale in-flight result never overwrites newer session state. The
/// resolution itself is not cancelled - its result is simply dropped.
pub struct SessionHolder<P, S> {
    resolver: AdminResolver<P, S>,
    require_admin: bool,
    profile: Mutex<Option<AdminProfile>>,
    generation: AtomicU64,
}

impl<P, S> SessionHolder<P, S>
where
    P: AuthProvider,
    S: DocumentStore,
{
    /// Create a holder around a resolver.
    ///
    /// `require_admin` selects strict mode (admin-only surface: any denial
    /// kills the session) versus permissive mode (non-admin sessions persist
    /// with a plain profile).
    #[must_use]
    pub const fn new(resolver: AdminResolver<P, S>, require_admin: bool) -> Self {
        Self {
            resolver,
            require_admin,
            profile: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// React to an auth-state change from the provider.
    ///
    /// `None` means signed out; `Some` triggers a full resolution, including
    /// a claim refresh. Returns the installed profile, or `None` if the
    /// session is gone or this resolution lost to a newer event.
    pub async fn handle_auth_change(&self, principal: Option<Principal>) -> Option<AdminProfile> {
        let generation = self.bump();

        let Some(principal) = principal else {
            self.install(generation, None);
            return None;
        };

        let claims = match self
            .resolver
            .provider()
            .token_claims(&principal, true)
            .await
        {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!(error = %e, "claims fetch failed; resolving without claims");
                None
            }
        };

        let result = self
            .resolver
            .resolve(&principal, claims.as_ref(), self.require_admin)
            .await;

        if self.install(generation, result.profile.clone()) {
            result.profile
        } else {
            None
        }
    }

    /// Interactive login. Installs the resolved profile on success and
    /// clears any held profile on failure (the resolver has already signed
    /// the provider session out for a [`LoginError::NotAdmin`]).
    ///
    /// # Errors
    ///
    /// Propagates [`LoginError`] from the resolver.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Login, LoginError> {
        let generation = self.bump();

        match self.resolver.login(email, password).await {
            Ok(login) => {
                self.install(generation, Some(login.profile.clone()));
                Ok(login)
            }
            Err(e) => {
                self.install(generation, None);
                Err(e)
            }
        }
    }

    /// Sign out and discard the held profile.
    pub async fn logout(&self) {
        let generation = self.bump();
        self.resolver.logout().await;
        self.install(generation, None);
    }

    /// The current session profile, if any.
    #[must_use]
    pub fn current(&self) -> Option<AdminProfile> {
        self.lock_profile().clone()
    }

    /// Whether any session exists (admin or, in permissive mode, plain).
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_profile().is_some()
    }

    /// Whether the current session carries an admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.lock_profile()
            .as_ref()
            .is_some_and(|profile| profile.role.is_some())
    }

    /// Start a new generation, invalidating in-flight resolutions.
    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `profile` if `generation` is still current. Returns whether
    /// the install happened.
    fn install(&self, generation: u64, profile: Option<AdminProfile>) -> bool {
        let mut guard = self.lock_profile();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *guard = profile;
        true
    }

    fn lock_profile(&self) -> std::sync::MutexGuard<'_, Option<AdminProfile>> {
        match self.profile.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
