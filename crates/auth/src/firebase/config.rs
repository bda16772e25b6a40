//! Firebase configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `GITA_FIREBASE_API_KEY` - Firebase web API key
//! - `GITA_FIREBASE_PROJECT_ID` - Firebase project id
//!
//! This is the single canonical configuration source; clients take a
//! `FirebaseConfig`, never raw keys.

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// An environment variable is set but unusable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Firebase web API key.
    pub api_key: SecretString,
    /// Firebase project id (e.g. `gita-app`).
    pub project_id: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl FirebaseConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: SecretString::from(required_var("GITA_FIREBASE_API_KEY")?),
            project_id: required_var("GITA_FIREBASE_PROJECT_ID")?,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(name, "empty value".to_owned()));
    }
    Ok(value)
}
