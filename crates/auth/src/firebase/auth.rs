//! Firebase Auth (Identity Toolkit) REST client.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gita_admin_core::{Email, Uid};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::config::FirebaseConfig;
use crate::principal::{Principal, TokenClaims};
use crate::provider::{AuthProvider, ProviderError};

/// Identity Toolkit REST base URL.
const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// Secure Token service base URL (token refresh).
const SECURE_TOKEN_BASE: &str = "https://securetoken.googleapis.com/v1";

/// Tokens for the currently signed-in principal.
struct SessionTokens {
    uid: Uid,
    id_token: SecretString,
    refresh_token: SecretString,
}

/// Firebase Auth client implementing [`AuthProvider`].
///
/// Holds at most one signed-in session, like the Firebase client SDK this
/// replaces. Signing out drops the held tokens; the ID token simply stops
/// being presented (Firebase has no server-side session to destroy).
pub struct FirebaseAuthClient {
    client: Client,
    api_key: SecretString,
    session: Mutex<Option<SessionTokens>>,
}

impl std::fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthClient")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Successful `accounts:signInWithPassword` response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    email: Option<String>,
    display_name: Option<String>,
}

/// Successful secure-token refresh response (snake_case, unlike sign-in).
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

/// Error envelope returned by both Google endpoints.
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl FirebaseAuthClient {
    /// Create a client for the configured project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            session: Mutex::new(None),
        }
    }

    /// The held ID token, for authenticating Firestore requests.
    pub async fn id_token(&self) -> Option<SecretString> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.id_token.clone())
    }

    /// Exchange the refresh token for a fresh ID token.
    async fn refresh(&self, session: &mut SessionTokens) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(format!(
                "{SECURE_TOKEN_BASE}/token?key={}",
                self.api_key.expose_secret()
            ))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Response(format!(
                "token refresh returned {status}"
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Response(e.to_string()))?;

        session.id_token = SecretString::from(refreshed.id_token);
        session.refresh_token = SecretString::from(refreshed.refresh_token);

        debug!("ID token refreshed");
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Principal, ProviderError> {
        let response = self
            .client
            .post(format!(
                "{IDENTITY_TOOLKIT_BASE}/accounts:signInWithPassword?key={}",
                self.api_key.expose_secret()
            ))
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let envelope: ApiErrorEnvelope = response
                .json()
                .await
                .map_err(|e| ProviderError::Response(e.to_string()))?;
            return Err(ProviderError::InvalidCredentials {
                message: friendly_auth_message(&envelope.error.message),
            });
        }

        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Response(e.to_string()))?;

        let principal = Principal {
            uid: Uid::from(signed_in.local_id),
            email: signed_in.email.as_deref().and_then(|e| Email::parse(e).ok()),
            display_name: signed_in.display_name,
        };

        *self.session.lock().await = Some(SessionTokens {
            uid: principal.uid.clone(),
            id_token: SecretString::from(signed_in.id_token),
            refresh_token: SecretString::from(signed_in.refresh_token),
        });

        debug!(uid = %principal.uid, "signed in");
        Ok(principal)
    }

    #[instrument(skip(self, principal), fields(uid = %principal.uid))]
    async fn token_claims(
        &self,
        principal: &Principal,
        force_refresh: bool,
    ) -> Result<TokenClaims, ProviderError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(ProviderError::NoSession)?;
        if session.uid != principal.uid {
            return Err(ProviderError::NoSession);
        }

        if force_refresh {
            self.refresh(session).await?;
        }

        decode_claims(session.id_token.expose_secret())
    }

    async fn sign_out(&self) {
        *self.session.lock().await = None;
        debug!("signed out");
    }
}

/// Read custom claims from a JWT's payload segment.
///
/// The token was just issued to this client by the provider over TLS;
/// signature verification is the provider's concern, not ours - we only
/// carry the claims it asserted.
fn decode_claims(id_token: &str) -> Result<TokenClaims, ProviderError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ProviderError::Response("malformed ID token".to_owned()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ProviderError::Response(format!("ID token payload: {e}")))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::Response(format!("ID token payload: {e}")))?;

    Ok(TokenClaims {
        role: claims
            .get("role")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned),
        admin: claims.get("admin").and_then(serde_json::Value::as_bool),
    })
}

/// Map an Identity Toolkit error code to a login-form message.
///
/// Codes may arrive with a trailing explanation
/// (`"TOO_MANY_ATTEMPTS_TRY_LATER : ..."`), so match on the prefix.
fn friendly_auth_message(code: &str) -> String {
    let code = code.split_whitespace().next().unwrap_or_default();
    match code {
        "EMAIL_NOT_FOUND" => "User not found",
        "INVALID_PASSWORD" => "Wrong password",
        "INVALID_LOGIN_CREDENTIALS" => "Invalid credentials",
        "INVALID_EMAIL" => "Invalid email",
        "USER_DISABLED" => "Account disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        _ => "Login failed",
    }
    .to_owned()
}
