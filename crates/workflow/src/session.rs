//! Session identity and credential lifecycle.
//!
//! The identity is advisory: it is read out of the bearer token payload without
//! checking the signature or expiry. The server validates the token on every
//! request, and an `Auth` failure from any component tears the session down.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use moderation_core::config::SessionConfig;
use moderation_core::{ModerationError, ModerationResult, RemoteError};

use crate::notify::NavigationSink;

/// Who is signed in, as claimed by the stored token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub subject_id: String,
    pub role: String,
}

/// Persistent home of the bearer token.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Credential store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock() = None;
    }
}

/// Remote login endpoint. Returns the issued bearer token.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<String, RemoteError>;
}

/// Derive a session identity from a bearer token.
///
/// Returns `None` for an absent token, a token without a decodable JSON
/// payload segment, or a payload missing either configured claim.
pub fn resolve(credential: Option<&str>, config: &SessionConfig) -> Option<SessionIdentity> {
    let token = credential?.trim();
    let mut segments = token.split('.');
    let (_header, payload) = (segments.next()?, segments.next()?);

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    Some(SessionIdentity {
        subject_id: claim_text(claims.get(&config.subject_claim)?)?,
        role: claim_text(claims.get(&config.role_claim)?)?,
    })
}

/// Claims are strings, numbers, or (for multi-role tokens) arrays whose first
/// entry is taken.
fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(claim_text),
        _ => None,
    }
}

/// Explicitly initialized session state shared by every board of the console.
pub struct SessionContext {
    config: SessionConfig,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn NavigationSink>,
    identity: RwLock<Option<SessionIdentity>>,
}

impl SessionContext {
    /// Reconstruct the session from the stored token. A token that does not
    /// resolve is removed from the store.
    pub fn initialize(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn NavigationSink>,
        config: &SessionConfig,
    ) -> Self {
        let stored = store.get();
        let identity = resolve(stored.as_deref(), config);

        match (&stored, &identity) {
            (Some(_), None) => {
                warn!("Stored credential could not be decoded, discarding");
                store.clear();
            }
            (_, Some(id)) => {
                info!(subject_id = %id.subject_id, role = %id.role, "Session restored")
            }
            (None, None) => {}
        }

        Self {
            config: config.clone(),
            store,
            navigator,
            identity: RwLock::new(identity),
        }
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.read().is_some()
    }

    /// Guard for protected views.
    pub fn require_identity(&self) -> ModerationResult<SessionIdentity> {
        self.identity()
            .ok_or_else(|| ModerationError::Auth("not signed in".to_string()))
    }

    /// Token to attach to outgoing requests.
    pub fn bearer(&self) -> Option<String> {
        self.store.get()
    }

    /// Log in through `client` and establish the session from the issued token.
    pub async fn sign_in(
        &self,
        client: &dyn AuthClient,
        email: &str,
        password: &str,
    ) -> ModerationResult<SessionIdentity> {
        let token = client.login(email, password).await?;
        self.establish(&token)
    }

    /// Adopt `token` as the session credential and go to the home view.
    pub fn establish(&self, token: &str) -> ModerationResult<SessionIdentity> {
        let identity = resolve(Some(token), &self.config)
            .ok_or_else(|| ModerationError::Auth("issued token could not be decoded".to_string()))?;

        self.store.set(token);
        *self.identity.write() = Some(identity.clone());
        info!(subject_id = %identity.subject_id, role = %identity.role, "Session established");
        self.navigator.redirect(&self.config.home_path);
        Ok(identity)
    }

    /// User-initiated sign out.
    pub fn logout(&self) {
        self.teardown();
        info!("Session closed");
        self.navigator.redirect(&self.config.login_path);
    }

    /// Teardown after the server rejected the credential. Returns `false` when
    /// there was no session left to tear down, in which case nothing happens.
    pub fn force_logout(&self) -> bool {
        if !self.teardown() {
            return false;
        }
        warn!("Credential rejected by server, session torn down");
        self.navigator.redirect(&self.config.login_path);
        true
    }

    /// Route an error through the session: `Auth` errors force a logout.
    pub fn observe(&self, err: &ModerationError) {
        if err.is_auth() {
            self.force_logout();
        }
    }

    fn teardown(&self) -> bool {
        let had_token = self.store.get().is_some();
        self.store.clear();
        let had_identity = self.identity.write().take().is_some();
        had_token || had_identity
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::notify::RecordingNavigator;

    /// Unsigned token carrying the given claims.
    pub(crate) fn token_with(claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    pub(crate) fn admin_token() -> String {
        let config = SessionConfig::default();
        let mut claims = serde_json::Map::new();
        claims.insert(config.subject_claim.clone(), Value::from("42"));
        claims.insert(config.role_claim.clone(), Value::from("Admin"));
        token_with(Value::Object(claims))
    }

    #[test]
    fn test_resolve_reads_configured_claims() {
        let identity = resolve(Some(&admin_token()), &SessionConfig::default()).unwrap();
        assert_eq!(identity.subject_id, "42");
        assert_eq!(identity.role, "Admin");
    }

    #[test]
    fn test_resolve_malformed_returns_none() {
        let config = SessionConfig::default();
        assert!(resolve(None, &config).is_none());
        assert!(resolve(Some(""), &config).is_none());
        assert!(resolve(Some("not-a-token"), &config).is_none());
        assert!(resolve(Some("a.!!!.c"), &config).is_none());
        // Valid base64, not JSON.
        let garbage = format!("h.{}.s", URL_SAFE_NO_PAD.encode("hello"));
        assert!(resolve(Some(&garbage), &config).is_none());
        // Missing role claim.
        let mut claims = serde_json::Map::new();
        claims.insert(config.subject_claim.clone(), Value::from("1"));
        let partial = token_with(Value::Object(claims));
        assert!(resolve(Some(&partial), &config).is_none());
    }

    #[test]
    fn test_resolve_multi_role_and_numeric_subject() {
        let config = SessionConfig::default();
        let mut claims = serde_json::Map::new();
        claims.insert(config.subject_claim.clone(), Value::from(9));
        claims.insert(config.role_claim.clone(), serde_json::json!(["Admin", "Auditor"]));
        let identity = resolve(Some(&token_with(Value::Object(claims))), &config).unwrap();
        assert_eq!(identity.subject_id, "9");
        assert_eq!(identity.role, "Admin");
    }

    #[test]
    fn test_initialize_discards_undecodable_token() {
        let store = Arc::new(MemoryCredentialStore::with_token("garbage"));
        let navigator = Arc::new(RecordingNavigator::new());
        let session =
            SessionContext::initialize(store.clone(), navigator.clone(), &SessionConfig::default());

        assert!(!session.is_authenticated());
        assert!(store.get().is_none());
        assert!(navigator.redirects().is_empty());
    }

    #[test]
    fn test_initialize_restores_identity() {
        let store = Arc::new(MemoryCredentialStore::with_token(admin_token()));
        let session = SessionContext::initialize(
            store,
            Arc::new(RecordingNavigator::new()),
            &SessionConfig::default(),
        );
        assert_eq!(session.require_identity().unwrap().subject_id, "42");
        assert!(session.bearer().is_some());
    }

    #[test]
    fn test_force_logout_clears_and_redirects_once() {
        let store = Arc::new(MemoryCredentialStore::with_token(admin_token()));
        let navigator = Arc::new(RecordingNavigator::new());
        let session =
            SessionContext::initialize(store.clone(), navigator.clone(), &SessionConfig::default());

        session.observe(&ModerationError::Auth("expired".to_string()));
        assert!(!session.is_authenticated());
        assert!(store.get().is_none());
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);

        // A second rejection finds nothing to tear down.
        assert!(!session.force_logout());
        assert_eq!(navigator.redirects().len(), 1);
    }

    #[test]
    fn test_non_auth_errors_keep_session() {
        let session = SessionContext::initialize(
            Arc::new(MemoryCredentialStore::with_token(admin_token())),
            Arc::new(RecordingNavigator::new()),
            &SessionConfig::default(),
        );
        session.observe(&ModerationError::NotFound("none".to_string()));
        assert!(session.is_authenticated());
    }

    struct StaticAuth(Result<String, RemoteError>);

    #[async_trait]
    impl AuthClient for StaticAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<String, RemoteError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_redirects_home() {
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let session =
            SessionContext::initialize(store.clone(), navigator.clone(), &SessionConfig::default());

        let identity = session
            .sign_in(&StaticAuth(Ok(admin_token())), "admin@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(identity.role, "Admin");
        assert_eq!(store.get(), Some(admin_token()));
        assert_eq!(navigator.last(), Some("/".to_string()));

        session.logout();
        assert!(store.get().is_none());
        assert_eq!(navigator.last(), Some("/login".to_string()));
    }

    #[tokio::test]
    async fn test_sign_in_with_bad_token_persists_nothing() {
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let session =
            SessionContext::initialize(store.clone(), navigator.clone(), &SessionConfig::default());

        let err = session
            .sign_in(&StaticAuth(Ok("opaque".to_string())), "a", "b")
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(store.get().is_none());
        assert!(navigator.redirects().is_empty());

        let err = session
            .sign_in(&StaticAuth(Err(RemoteError::auth("bad password"))), "a", "b")
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }
}
