//! Interactive login check against the live project.
//!
//! Signs in with email/password, runs the full authorization resolution, and
//! prints the resolved profile as JSON. The session is signed out again
//! before the command exits.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;

use gita_admin_auth::firebase::{ConfigError, FirebaseAuthClient, FirebaseConfig, FirestoreClient};
use gita_admin_auth::{AdminResolver, LoginError};

/// Errors that can occur during the login check.
#[derive(Debug, Error)]
pub enum LoginCmdError {
    /// Firebase configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No password was supplied.
    #[error("Missing password: pass --password or set GITA_ADMIN_PASSWORD")]
    MissingPassword,

    /// The login itself failed.
    #[error(transparent)]
    Login(#[from] LoginError),

    /// The profile could not be rendered.
    #[error("Could not serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run the login check.
///
/// # Errors
///
/// Returns [`LoginCmdError`] on missing configuration or password, rejected
/// credentials, or a non-admin account.
pub async fn run(email: &str, password: Option<String>) -> Result<(), LoginCmdError> {
    let config = FirebaseConfig::from_env()?;
    let provider = Arc::new(FirebaseAuthClient::new(&config));
    let store = Arc::new(FirestoreClient::with_auth(&config, Arc::clone(&provider)));
    let resolver = AdminResolver::new(provider, store);

    let password = password
        .or_else(|| std::env::var("GITA_ADMIN_PASSWORD").ok())
        .ok_or(LoginCmdError::MissingPassword)?;

    tracing::info!("Signing in as {email}...");
    let login = resolver.login(email, &SecretString::from(password)).await?;

    if let Some(warning) = &login.warning {
        tracing::warn!("{warning}");
    }

    println!("{}", serde_json::to_string_pretty(&login.profile)?);

    // Leave no session behind.
    resolver.logout().await;
    Ok(())
}
