//! Auth-provider collaborator seam.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::principal::{Principal, TokenClaims};

/// Errors surfaced by an auth provider implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the credentials. The message is already
    /// human-readable and safe to show in the login form.
    #[error("{message}")]
    InvalidCredentials {
        /// User-facing message (e.g. "Wrong password").
        message: String,
    },
    /// The request could not be sent.
    #[error("Auth request failed: {0}")]
    Request(String),
    /// The response could not be decoded.
    #[error("Invalid auth response: {0}")]
    Response(String),
    /// No signed-in session is held for the requested principal.
    #[error("No active session")]
    NoSession,
}

impl ProviderError {
    /// A short message suitable for the login form.
    ///
    /// Credential rejections carry their own wording; anything else collapses
    /// to a generic failure so raw transport errors never reach the UI.
    #[must_use]
    pub fn login_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message } => message.clone(),
            Self::Request(_) | Self::Response(_) | Self::NoSession => "Login failed".to_owned(),
        }
    }
}

/// A token-issuing auth provider (Firebase Auth in production).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for a signed-in principal.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidCredentials`] when the provider
    /// rejects the credentials, or a transport-level variant otherwise.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Principal, ProviderError>;

    /// Read the custom claims attached to the principal's ID token.
    ///
    /// `force_refresh` exchanges the refresh token for a fresh ID token first,
    /// so recently granted claims are visible.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoSession`] when no session is held for the
    /// principal, or a transport-level variant on refresh/decode failure.
    async fn token_claims(
        &self,
        principal: &Principal,
        force_refresh: bool,
    ) -> Result<TokenClaims, ProviderError>;

    /// Invalidate the provider-side session.
    ///
    /// Must take effect before returning: a subsequent unauthenticated check
    /// has to observe the signed-out state immediately.
    async fn sign_out(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_message_passes_credential_wording_through() {
        let err = ProviderError::InvalidCredentials {
            message: "Wrong password".to_owned(),
        };
        assert_eq!(err.login_message(), "Wrong password");
    }

    #[test]
    fn test_login_message_hides_transport_detail() {
        let err = ProviderError::Request("connection reset by peer".to_owned());
        assert_eq!(err.login_message(), "Login failed");
    }
}
