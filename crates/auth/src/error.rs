//! Login error taxonomy.
//!
//! Session-observer resolution never errors - [`resolve`] always returns an
//! [`AuthorizationResult`] value, mapping internal faults to the
//! least-privileged outcome. Only the interactive login entry point has
//! failure modes worth surfacing, and both carry short human-readable
//! strings, never raw provider or store errors.
//!
//! [`resolve`]: crate::AdminResolver::resolve
//! [`AuthorizationResult`]: crate::AuthorizationResult

use thiserror::Error;

/// Failure of an interactive [`login`](crate::AdminResolver::login).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    /// The provider rejected the credentials (or could not be reached; the
    /// message is generic in that case).
    #[error("{message}")]
    InvalidCredentials {
        /// User-facing message.
        message: String,
    },
    /// Credentials were valid but every authorization tier denied. The fresh
    /// session has already been signed back out.
    #[error("Account is not an admin")]
    NotAdmin,
}
