//! Resolver and session-holder behavior against fake collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Map, Value, json};

use gita_admin_auth::{
    AdminProfile, AdminResolver, AuthProvider, Document, DocumentStore, LoginError, Principal,
    ProviderError, SessionHolder, StoreError, TokenClaims,
};
use gita_admin_core::{AdminRole, Email, Uid};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeProvider {
    /// Email/password pair accepted by sign-in, and the principal it yields.
    account: Option<(String, String, Principal)>,
    /// Claims returned for any principal.
    claims: TokenClaims,
    /// Fail every claims fetch.
    claims_fail: bool,
    sign_out_calls: AtomicUsize,
}

impl FakeProvider {
    fn sign_outs(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Principal, ProviderError> {
        use secrecy::ExposeSecret;

        match &self.account {
            Some((e, p, principal)) if e == email && p == password.expose_secret() => {
                Ok(principal.clone())
            }
            Some((e, _, _)) if e == email => Err(ProviderError::InvalidCredentials {
                message: "Wrong password".to_owned(),
            }),
            _ => Err(ProviderError::InvalidCredentials {
                message: "User not found".to_owned(),
            }),
        }
    }

    async fn token_claims(
        &self,
        _principal: &Principal,
        _force_refresh: bool,
    ) -> Result<TokenClaims, ProviderError> {
        if self.claims_fail {
            return Err(ProviderError::Request("claims backend down".to_owned()));
        }
        Ok(self.claims.clone())
    }

    async fn sign_out(&self) {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeStore {
    /// Admin documents by document id.
    admins: HashMap<String, Document>,
    /// User documents (matched by their `email` field).
    users: Vec<Document>,
    fail_gets: bool,
    fail_queries: bool,
    /// Delay every call, for generation-guard tests.
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeStore {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.tick().await;
        if self.fail_gets {
            return Err(StoreError::Request("connection refused".to_owned()));
        }
        assert_eq!(collection, "admins");
        Ok(self.admins.get(id).cloned())
    }

    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        self.tick().await;
        if self.fail_queries {
            return Err(StoreError::Request("connection refused".to_owned()));
        }
        assert_eq!(collection, "users");
        Ok(self
            .users
            .iter()
            .filter(|doc| doc.fields.get(field).and_then(Value::as_str) == Some(value))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn principal(email: &str) -> Principal {
    Principal {
        uid: Uid::from("uid-1"),
        email: Some(Email::parse(email).expect("valid test email")),
        display_name: Some("Test Admin".to_owned()),
    }
}

fn doc(id: &str, fields: Value) -> Document {
    let Value::Object(fields) = fields else {
        panic!("fields must be an object")
    };
    Document {
        id: id.to_owned(),
        fields: fields.into_iter().collect::<Map<String, Value>>(),
    }
}

fn admin_claims() -> TokenClaims {
    TokenClaims {
        role: None,
        admin: Some(true),
    }
}

fn resolver(
    provider: Arc<FakeProvider>,
    store: Arc<FakeStore>,
) -> AdminResolver<FakeProvider, FakeStore> {
    AdminResolver::new(provider, store)
}

// ============================================================================
// Tier behavior
// ============================================================================

#[tokio::test]
async fn claim_grants_without_any_store_access() {
    // The store errors on any call; a claim-authorized principal must never
    // trigger one.
    let store = Arc::new(FakeStore {
        fail_gets: true,
        fail_queries: true,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(provider, Arc::clone(&store));

    let result = resolver
        .resolve(&principal("a@x.com"), Some(&admin_claims()), true)
        .await;

    assert!(result.authorized);
    let profile = result.profile.expect("claim tier yields a profile");
    assert_eq!(profile.role, Some(AdminRole::Admin));
    assert!(profile.extra.is_empty());
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn admin_record_at_raw_email_id_grants() {
    let mut admins = HashMap::new();
    admins.insert(
        "a@x.com".to_owned(),
        doc("a@x.com", json!({ "role": "admin", "addedBy": "ops" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), store);

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(result.authorized);
    assert!(result.warning.is_some(), "legacy record carries a warning");
    let profile = result.profile.expect("profile");
    assert_eq!(profile.role, Some(AdminRole::Admin));
    assert_eq!(profile.extra.get("addedBy"), Some(&json!("ops")));
    assert_eq!(provider.sign_outs(), 0);
}

#[tokio::test]
async fn admin_record_under_legacy_id_grants() {
    // Record exists only under the escaped historical id.
    let mut admins = HashMap::new();
    admins.insert(
        "a,b_at_x,com".to_owned(),
        doc("a,b_at_x,com", json!({ "role": "super_admin" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(provider, store);

    let result = resolver.resolve(&principal("a.b@x.com"), None, true).await;

    assert!(result.authorized);
    assert_eq!(
        result.profile.expect("profile").role,
        Some(AdminRole::SuperAdmin)
    );
}

#[tokio::test]
async fn user_record_role_grants_as_last_resort() {
    let store = Arc::new(FakeStore {
        users: vec![doc(
            "user-1",
            json!({ "email": "a@x.com", "role": "super_admin", "name": "Record Name" }),
        )],
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(provider, store);

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(result.authorized);
    assert!(result.warning.is_none());
    let profile = result.profile.expect("profile");
    assert_eq!(profile.role, Some(AdminRole::SuperAdmin));
    assert_eq!(profile.name.as_deref(), Some("Record Name"));
}

#[tokio::test]
async fn user_record_with_plain_role_denies() {
    let store = Arc::new(FakeStore {
        users: vec![doc("user-1", json!({ "email": "a@x.com", "role": "user" }))],
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), store);

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(!result.authorized);
    assert!(result.profile.is_none());
    assert_eq!(provider.sign_outs(), 1);
}

// ============================================================================
// Terminal behavior
// ============================================================================

#[tokio::test]
async fn strict_denial_signs_out_exactly_once() {
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), Arc::new(FakeStore::default()));

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(!result.authorized);
    assert!(result.profile.is_none());
    assert_eq!(provider.sign_outs(), 1);
}

#[tokio::test]
async fn permissive_denial_keeps_plain_session() {
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), Arc::new(FakeStore::default()));

    let result = resolver.resolve(&principal("a@x.com"), None, false).await;

    assert!(result.authorized);
    let profile = result.profile.expect("plain profile");
    assert_eq!(profile, AdminProfile::basic(&principal("a@x.com")));
    assert_eq!(profile.role, None);
    assert_eq!(provider.sign_outs(), 0);
}

#[tokio::test]
async fn principal_without_uid_is_fully_denied() {
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), Arc::new(FakeStore::default()));
    let bad = Principal {
        uid: Uid::from(""),
        email: Some(Email::parse("a@x.com").expect("valid")),
        display_name: None,
    };

    // Even permissive mode refuses a principal with no uid.
    let result = resolver.resolve(&bad, Some(&admin_claims()), false).await;
    assert!(!result.authorized);
    assert!(result.profile.is_none());
}

// ============================================================================
// Error policy
// ============================================================================

#[tokio::test]
async fn store_failures_fall_through_to_later_tiers() {
    // Admin-doc gets fail, but the users query still answers.
    let store = Arc::new(FakeStore {
        fail_gets: true,
        users: vec![doc("user-1", json!({ "email": "a@x.com", "role": "admin" }))],
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(provider, store);

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(result.authorized);
    assert_eq!(result.profile.expect("profile").role, Some(AdminRole::Admin));
}

#[tokio::test]
async fn total_store_outage_maps_to_denial_not_error() {
    let store = Arc::new(FakeStore {
        fail_gets: true,
        fail_queries: true,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(Arc::clone(&provider), store);

    let result = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert!(!result.authorized);
    assert_eq!(provider.sign_outs(), 1);
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let mut admins = HashMap::new();
    admins.insert(
        "a@x.com".to_owned(),
        doc("a@x.com", json!({ "role": "admin" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let resolver = resolver(provider, store);

    let first = resolver.resolve(&principal("a@x.com"), None, true).await;
    let second = resolver.resolve(&principal("a@x.com"), None, true).await;

    assert_eq!(first, second);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_with_bad_credentials_never_reaches_tiers() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(FakeProvider {
        account: Some((
            "bad@x.com".to_owned(),
            "rightpass".to_owned(),
            principal("bad@x.com"),
        )),
        ..FakeProvider::default()
    });
    let resolver = resolver(provider, Arc::clone(&store));

    let err = resolver
        .login("bad@x.com", &SecretString::from("wrongpass".to_owned()))
        .await
        .expect_err("rejected credentials");

    assert_eq!(
        err,
        LoginError::InvalidCredentials {
            message: "Wrong password".to_owned()
        }
    );
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn login_as_non_admin_signs_back_out() {
    let provider = Arc::new(FakeProvider {
        account: Some((
            "a@x.com".to_owned(),
            "pass".to_owned(),
            principal("a@x.com"),
        )),
        ..FakeProvider::default()
    });
    let resolver = resolver(Arc::clone(&provider), Arc::new(FakeStore::default()));

    let err = resolver
        .login("a@x.com", &SecretString::from("pass".to_owned()))
        .await
        .expect_err("no tier grants");

    assert_eq!(err, LoginError::NotAdmin);
    assert_eq!(err.to_string(), "Account is not an admin");
    assert_eq!(provider.sign_outs(), 1);
}

#[tokio::test]
async fn login_via_legacy_record_succeeds_with_warning() {
    let mut admins = HashMap::new();
    admins.insert(
        "a@x.com".to_owned(),
        doc("a@x.com", json!({ "role": "admin" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider {
        account: Some((
            "a@x.com".to_owned(),
            "pass".to_owned(),
            principal("a@x.com"),
        )),
        ..FakeProvider::default()
    });
    let resolver = resolver(Arc::clone(&provider), store);

    let login = resolver
        .login("a@x.com", &SecretString::from("pass".to_owned()))
        .await
        .expect("admin login");

    assert_eq!(login.profile.role, Some(AdminRole::Admin));
    assert!(login.warning.is_some());
    assert_eq!(provider.sign_outs(), 0);
}

#[tokio::test]
async fn login_survives_claims_fetch_failure() {
    // Claims backend down, but a legacy admin record matches.
    let mut admins = HashMap::new();
    admins.insert(
        "a@x.com".to_owned(),
        doc("a@x.com", json!({ "role": "admin" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider {
        account: Some((
            "a@x.com".to_owned(),
            "pass".to_owned(),
            principal("a@x.com"),
        )),
        claims_fail: true,
        ..FakeProvider::default()
    });
    let resolver = resolver(provider, store);

    let login = resolver
        .login("a@x.com", &SecretString::from("pass".to_owned()))
        .await
        .expect("document tiers still run");
    assert_eq!(login.profile.role, Some(AdminRole::Admin));
}

// ============================================================================
// Session holder
// ============================================================================

#[tokio::test]
async fn holder_installs_profile_on_auth_change() {
    let provider = Arc::new(FakeProvider {
        claims: admin_claims(),
        ..FakeProvider::default()
    });
    let holder = SessionHolder::new(
        AdminResolver::new(provider, Arc::new(FakeStore::default())),
        true,
    );

    assert!(!holder.is_authenticated());

    let installed = holder.handle_auth_change(Some(principal("a@x.com"))).await;
    assert!(installed.is_some());
    assert!(holder.is_authenticated());
    assert!(holder.is_admin());

    holder.handle_auth_change(None).await;
    assert!(!holder.is_authenticated());
}

#[tokio::test]
async fn holder_clears_profile_on_logout() {
    let provider = Arc::new(FakeProvider {
        claims: admin_claims(),
        ..FakeProvider::default()
    });
    let holder = SessionHolder::new(
        AdminResolver::new(Arc::clone(&provider), Arc::new(FakeStore::default())),
        true,
    );

    holder.handle_auth_change(Some(principal("a@x.com"))).await;
    assert!(holder.is_admin());

    holder.logout().await;
    assert!(!holder.is_authenticated());
    assert_eq!(provider.sign_outs(), 1);
}

#[tokio::test]
async fn holder_permissive_mode_keeps_non_admin_session() {
    let provider = Arc::new(FakeProvider::default());
    let holder = SessionHolder::new(
        AdminResolver::new(Arc::clone(&provider), Arc::new(FakeStore::default())),
        false,
    );

    holder.handle_auth_change(Some(principal("a@x.com"))).await;

    assert!(holder.is_authenticated());
    assert!(!holder.is_admin());
    assert_eq!(provider.sign_outs(), 0);
}

#[tokio::test]
async fn stale_resolution_does_not_overwrite_newer_state() {
    // The store answers slowly; a logout lands while resolution is in
    // flight. The late result must be discarded.
    let mut admins = HashMap::new();
    admins.insert(
        "a@x.com".to_owned(),
        doc("a@x.com", json!({ "role": "admin" })),
    );
    let store = Arc::new(FakeStore {
        admins,
        delay: Some(Duration::from_millis(50)),
        ..FakeStore::default()
    });
    let provider = Arc::new(FakeProvider::default());
    let holder = Arc::new(SessionHolder::new(
        AdminResolver::new(provider, store),
        true,
    ));

    let slow = {
        let holder = Arc::clone(&holder);
        tokio::spawn(async move { holder.handle_auth_change(Some(principal("a@x.com"))).await })
    };

    // Let the slow resolution start, then supersede it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    holder.logout().await;

    let installed = slow.await.expect("task completes");
    assert!(installed.is_none(), "stale resolution is discarded");
    assert!(!holder.is_authenticated());
}
