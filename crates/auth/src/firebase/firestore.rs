//! Firestore REST client.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::auth::FirebaseAuthClient;
use super::config::FirebaseConfig;
use crate::store::{Document, DocumentStore, StoreError};

/// Firestore REST base URL.
const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// Firestore client implementing [`DocumentStore`].
///
/// When built with [`FirestoreClient::with_auth`], reads present the signed-in
/// principal's current ID token as a bearer; otherwise requests go out with
/// the API key alone and are subject to the project's public rules.
pub struct FirestoreClient {
    client: Client,
    api_key: SecretString,
    /// `projects/{id}/databases/(default)/documents` under the REST base.
    documents_root: String,
    auth: Option<Arc<FirebaseAuthClient>>,
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("api_key", &"[REDACTED]")
            .field("documents_root", &self.documents_root)
            .finish_non_exhaustive()
    }
}

impl FirestoreClient {
    /// Create a client for the configured project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            documents_root: format!(
                "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            auth: None,
        }
    }

    /// Authenticate reads with the session held by `auth`.
    #[must_use]
    pub fn with_auth(config: &FirebaseConfig, auth: Arc<FirebaseAuthClient>) -> Self {
        Self {
            auth: Some(auth),
            ..Self::new(config)
        }
    }

    async fn bearer(&self) -> Option<SecretString> {
        match &self.auth {
            Some(auth) => auth.id_token().await,
            None => None,
        }
    }

    /// Document URL with the id percent-encoded as a single path segment
    /// (raw email ids contain `@`).
    fn doc_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.documents_root)
            .map_err(|e| StoreError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Request("cannot-be-a-base documents url".to_owned()))?
            .push(collection)
            .push(id);
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    fn query_url(&self) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}:runQuery", self.documents_root))
            .map_err(|e| StoreError::Request(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer().await {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let url = self.doc_url(collection, id)?;
        let response = self
            .apply_auth(self.client.get(url))
            .await
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("document not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("{status}: {body}")));
        }

        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;

        Ok(Some(doc.into_document()))
    }

    #[instrument(skip(self, value))]
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": value },
                    }
                },
                "limit": limit,
            }
        });

        let response = self
            .apply_auth(self.client.post(self.query_url()?))
            .await
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("{status}: {body}")));
        }

        // runQuery streams one item per result; items without a document are
        // progress markers (readTime only).
        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;

        let docs: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(FirestoreDocument::into_document)
            .collect();

        debug!(count = docs.len(), "query results");
        Ok(docs)
    }
}

/// Wire form of a Firestore document.
#[derive(Deserialize)]
struct FirestoreDocument {
    /// Full resource name; the document id is the last path segment.
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>,
}

impl FirestoreDocument {
    fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_owned();
        let fields: Map<String, Value> = self
            .fields
            .into_iter()
            .map(|(k, v)| (k, v.into_json()))
            .collect();
        Document { id, fields }
    }
}

#[derive(Deserialize)]
struct RunQueryItem {
    document: Option<FirestoreDocument>,
}

/// Firestore's typed value wrapper, flattened to plain JSON.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    string_value: Option<String>,
    /// Sent as a string on the wire.
    integer_value: Option<String>,
    double_value: Option<f64>,
    boolean_value: Option<bool>,
    timestamp_value: Option<String>,
    reference_value: Option<String>,
    null_value: Option<Value>,
    map_value: Option<FirestoreMapValue>,
    array_value: Option<FirestoreArrayValue>,
}

#[derive(Deserialize)]
struct FirestoreMapValue {
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>,
}

#[derive(Deserialize)]
struct FirestoreArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

impl FirestoreValue {
    fn into_json(self) -> Value {
        if let Some(s) = self.string_value {
            return Value::String(s);
        }
        if let Some(i) = self.integer_value {
            return i.parse::<i64>().map_or(Value::Null, Value::from);
        }
        if let Some(d) = self.double_value {
            return serde_json::Number::from_f64(d).map_or(Value::Null, Value::Number);
        }
        if let Some(b) = self.boolean_value {
            return Value::Bool(b);
        }
        if let Some(ts) = self.timestamp_value {
            return Value::String(ts);
        }
        if let Some(r) = self.reference_value {
            return Value::String(r);
        }
        if let Some(map) = self.map_value {
            return Value::Object(
                map.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            );
        }
        if let Some(array) = self.array_value {
            return Value::Array(array.values.into_iter().map(Self::into_json).collect());
        }
        // nullValue, or an unrecognized value kind.
        let _ = self.null_value;
        Value::Null
    }
}
