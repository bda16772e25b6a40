//! Firebase REST implementations of the collaborator seams.
//!
//! The panel's production collaborators: Firebase Auth (Identity Toolkit)
//! behind [`AuthProvider`](crate::AuthProvider) and Firestore behind
//! [`DocumentStore`](crate::DocumentStore).

mod auth;
mod config;
mod firestore;

pub use auth::FirebaseAuthClient;
pub use config::{ConfigError, FirebaseConfig};
pub use firestore::FirestoreClient;
