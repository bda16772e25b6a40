//! Document-store collaborator seam.

use async_trait::async_trait;
use gita_admin_core::AdminRole;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by a document store implementation.
///
/// The resolver swallows all of these (a failed fetch is treated as a missed
/// tier), but implementations and operational tools still want the detail.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be sent.
    #[error("Store request failed: {0}")]
    Request(String),
    /// The response could not be decoded.
    #[error("Invalid store response: {0}")]
    Response(String),
    /// The store rejected the request.
    #[error("Store error: {0}")]
    Api(String),
}

/// A document fetched from the store: its id plus decoded JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Decoded field map.
    pub fields: Map<String, Value>,
}

impl Document {
    /// The document's `role` field parsed as an admin role.
    ///
    /// Returns `None` when the field is absent, not a string, or carries a
    /// non-qualifying role such as `"user"`.
    #[must_use]
    pub fn role(&self) -> Option<AdminRole> {
        self.fields
            .get("role")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Whether the document grants admin access.
    #[must_use]
    pub fn grants_admin(&self) -> bool {
        self.role().is_some()
    }
}

/// Read access to a document store (Firestore in production).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by collection and id.
    ///
    /// Returns `Ok(None)` when the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be reached or answers
    /// with something other than a document or a not-found.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Query a collection for documents whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be reached or the
    /// response cannot be decoded.
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError>;
}
