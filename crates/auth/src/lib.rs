//! Gita Admin Auth - admin authorization resolution.
//!
//! The Gita admin panel grew three generations of "who is an admin" data:
//! custom claims on the Firebase ID token, an `admins` collection keyed by
//! email (under two historical id schemes), and a `role` field on documents in
//! the `users` collection. This crate collapses the four near-identical
//! lookup chains that existed in the panel into one [`AdminResolver`] that
//! walks ordered, short-circuiting tiers:
//!
//! 1. token claims (`role == "admin"` or `admin == true`) - no store access
//! 2. admin document at the raw email id
//! 3. admin document at the escaped legacy id (`.` -> `,`, `@` -> `_at_`)
//! 4. users-collection lookup by `email` field
//! 5. terminal: deny (strict mode signs the session out) or permit a plain
//!    non-admin session (permissive mode)
//!
//! The resolver consumes two collaborator seams, [`AuthProvider`] and
//! [`DocumentStore`]. Concrete Firebase REST implementations live in
//! [`firebase`]; tests inject in-memory fakes.
//!
//! Session lifetime belongs to [`SessionHolder`], which guards in-flight
//! resolutions with a generation counter so a stale result never overwrites a
//! newer principal's state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod firebase;
pub mod principal;
pub mod profile;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod store;

pub use error::LoginError;
pub use principal::{Principal, TokenClaims};
pub use profile::{AdminProfile, AuthorizationResult};
pub use provider::{AuthProvider, ProviderError};
pub use resolver::{AdminResolver, Login};
pub use session::SessionHolder;
pub use store::{Document, DocumentStore, StoreError};
