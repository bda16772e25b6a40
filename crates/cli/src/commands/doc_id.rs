//! Derive the admin-document id candidates for an email.
//!
//! Admin records exist under two historical id schemes; this prints both so
//! an operator can find (or create) the right document by hand.

#![allow(clippy::print_stdout)]

use gita_admin_core::{Email, EmailError};

/// Print both id candidates for `email`.
///
/// # Errors
///
/// Returns [`EmailError`] when the input is not a valid email address.
pub fn run(email: &str) -> Result<(), EmailError> {
    let email = Email::parse(email)?;
    println!("raw:    {email}");
    println!("legacy: {}", email.legacy_doc_id());
    Ok(())
}
