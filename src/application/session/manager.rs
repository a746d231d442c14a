//! Session manager: owns the single local session
//!
//! All identity state lives here. Views read snapshots or subscribe to
//! changes; the only mutations are `restore()`, `login()` and `logout()`.
//! Operations are serialized: a call waits until the previous one finishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::error::RESTORE_FAILED;
use crate::domain::session::{decode_record, encode_record};
use crate::domain::{
    LoginError, SessionPhase, SessionRestoreError, SessionState, SharedStore, SharedVerifier,
    StorageError, User, UserRole,
};

/// Default storage key for the persisted session.
pub const DEFAULT_SESSION_KEY: &str = "society_user";

/// Session manager settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Storage key holding the persisted record.
    pub storage_key: String,
    /// Upper bound on credential verification. `None` waits indefinitely.
    pub login_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            login_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Returned to the caller after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_id: String,
    pub role: UserRole,
}

pub struct SessionManager {
    store: SharedStore,
    verifier: SharedVerifier,
    options: SessionOptions,
    state: watch::Sender<SessionState>,
    op_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a manager in the `Restoring` phase. Call [`restore`](Self::restore) next.
    pub fn new(store: SharedStore, verifier: SharedVerifier, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(SessionState::restoring());
        Self {
            store,
            verifier,
            options,
            state,
            op_lock: Mutex::new(()),
        }
    }

    pub fn shared(
        store: SharedStore,
        verifier: SharedVerifier,
        options: SessionOptions,
    ) -> SharedSessionManager {
        Arc::new(Self::new(store, verifier, options))
    }

    // ── Observation ─────────────────────────────────────────────

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading()
    }

    // ── Operations ──────────────────────────────────────────────

    /// Recover a previously persisted session.
    ///
    /// Only meaningful once, in the `Restoring` phase; later calls log and
    /// return the current state unchanged. A missing record signs out
    /// quietly, an unreadable one signs out with an error.
    pub async fn restore(&self) -> SessionState {
        let _guard = self.op_lock.lock().await;

        if !matches!(self.state.borrow().phase(), SessionPhase::Restoring) {
            warn!("Session restore requested after startup; ignoring");
            return self.state();
        }

        let next = match self.read_record().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, role = %user.role, "Session restored");
                SessionState::signed_in(user)
            }
            Ok(None) => {
                info!("No saved session");
                SessionState::signed_out(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore session");
                SessionState::signed_out(Some(RESTORE_FAILED))
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    /// Authenticate and persist a new session.
    ///
    /// On rejection, timeout or a failed write the session stays signed out
    /// with the error recorded; a previously persisted record is never
    /// touched unless the new one is written successfully.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        let _guard = self.op_lock.lock().await;

        match self.state.borrow().phase() {
            SessionPhase::Restoring => return Err(LoginError::NotReady),
            SessionPhase::Authenticated(_) => return Err(LoginError::AlreadyAuthenticated),
            SessionPhase::Unauthenticated => {}
        }

        info!(email, "Login attempt");
        self.state.send_modify(SessionState::begin_attempt);

        match self.authenticate_and_save(email, password).await {
            Ok(user) => {
                let outcome = LoginOutcome {
                    user_id: user.id.clone(),
                    role: user.role,
                };
                info!(user_id = %user.id, role = %user.role, "Login succeeded");
                self.state.send_replace(SessionState::signed_in(user));
                Ok(outcome)
            }
            Err(e) => {
                warn!(email, error = %e, "Login failed");
                self.state
                    .send_replace(SessionState::signed_out(e.state_message()));
                Err(e)
            }
        }
    }

    /// End the session.
    ///
    /// The in-memory state always becomes signed out. A storage failure
    /// while removing the record is returned to the caller. Before
    /// `restore()` has run there is no session to end and nothing changes.
    pub async fn logout(&self) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;

        if matches!(self.state.borrow().phase(), SessionPhase::Restoring) {
            warn!("Logout requested before session restore; ignoring");
            return Ok(());
        }

        let result = self.store.delete(&self.options.storage_key).await;
        if let Err(e) = &result {
            warn!(error = %e, "Failed to remove saved session");
        }

        if let Some(user) = self.state.borrow().current_user() {
            info!(user_id = %user.id, "Logged out");
        }
        self.state.send_replace(SessionState::signed_out(None));
        result
    }

    // ── Internals ───────────────────────────────────────────────

    async fn read_record(&self) -> Result<Option<User>, SessionRestoreError> {
        let key = &self.options.storage_key;
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        debug!(key = %key, bytes = raw.len(), "Read saved session");
        decode_record(&raw).map(Some)
    }

    async fn authenticate_and_save(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let verify = self.verifier.verify(email, password);
        let user = match self.options.login_timeout {
            Some(limit) => tokio::time::timeout(limit, verify)
                .await
                .map_err(|_| LoginError::Timeout(limit))??,
            None => verify.await?,
        };

        let record = encode_record(&user).map_err(LoginError::Encode)?;
        self.store
            .set(&self.options.storage_key, record)
            .await
            .map_err(LoginError::StorageWrite)?;
        Ok(user)
    }
}

pub type SharedSessionManager = Arc<SessionManager>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{INVALID_CREDENTIALS, LOGIN_TIMED_OUT};
    use crate::domain::{AuthenticationError, CredentialVerifier, KeyValueStore, Screen};
    use crate::infrastructure::auth::mock_resident;
    use crate::infrastructure::{MemoryStore, MockVerifier};
    use async_trait::async_trait;

    const KEY: &str = DEFAULT_SESSION_KEY;

    fn options() -> SessionOptions {
        SessionOptions {
            storage_key: KEY.to_string(),
            login_timeout: Some(Duration::from_secs(2)),
        }
    }

    fn manager_with(store: Arc<dyn KeyValueStore>, verifier: SharedVerifier) -> SessionManager {
        SessionManager::new(store, verifier, options())
    }

    async fn restored(store: Arc<MemoryStore>) -> SessionManager {
        let manager = manager_with(store, Arc::new(MockVerifier::instant()));
        manager.restore().await;
        manager
    }

    /// Accepts credentials but refuses every write.
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }
        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".into()))
        }
    }

    /// Rejects every attempt after a delay.
    struct Rejecting(Duration);

    #[async_trait]
    impl CredentialVerifier for Rejecting {
        async fn verify(&self, _email: &str, _password: &str) -> Result<User, AuthenticationError> {
            tokio::time::sleep(self.0).await;
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    struct NeverAnswers;

    #[async_trait]
    impl CredentialVerifier for NeverAnswers {
        async fn verify(&self, _email: &str, _password: &str) -> Result<User, AuthenticationError> {
            std::future::pending().await
        }
    }

    // ── restore ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_starts_restoring_and_loading() {
        let manager = manager_with(Arc::new(MemoryStore::new()), Arc::new(MockVerifier::instant()));
        let state = manager.state();
        assert_eq!(state.phase(), &SessionPhase::Restoring);
        assert!(state.loading());
        assert_eq!(state.screen(), Screen::Loading);
    }

    #[tokio::test]
    async fn test_restore_without_record() {
        let manager = manager_with(Arc::new(MemoryStore::new()), Arc::new(MockVerifier::instant()));
        let mut rx = manager.subscribe();
        assert_eq!(rx.borrow_and_update().phase(), &SessionPhase::Restoring);

        let state = manager.restore().await;
        assert_eq!(state.phase(), &SessionPhase::Unauthenticated);
        assert!(!state.loading());
        assert!(state.error().is_none());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase(), &SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_resident_record() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(KEY, encode_record(&mock_resident()).unwrap())
            .await
            .unwrap();

        let manager = manager_with(store, Arc::new(MockVerifier::instant()));
        let mut rx = manager.subscribe();
        assert_eq!(rx.borrow_and_update().phase(), &SessionPhase::Restoring);

        manager.restore().await;
        let state = rx.borrow_and_update().clone();
        let user = state.current_user().unwrap();
        assert_eq!(user.role, UserRole::Resident);
        assert_eq!(user.flat(), Some("A-101"));
        assert!(!state.loading());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_restore_malformed_records() {
        let garbage = [
            "not json at all".to_string(),
            "{}".to_string(),
            r#"{"version":1,"savedAt":"2024-01-01T00:00:00Z","user":{"id":"1"}}"#.to_string(),
            encode_record(&mock_resident())
                .unwrap()
                .replacen("\"version\":1", "\"version\":2", 1),
        ];

        for raw in garbage {
            let store = Arc::new(MemoryStore::new());
            store.set(KEY, raw.clone()).await.unwrap();
            let manager = restored(store.clone()).await;

            let state = manager.state();
            assert!(state.current_user().is_none(), "record {:?}", raw);
            assert!(!state.loading());
            assert_eq!(state.error(), Some(RESTORE_FAILED));
            // Restore is read-only.
            assert_eq!(store.get(KEY).await.unwrap(), Some(raw));
        }
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let manager = restored(store.clone()).await;

        store
            .set(KEY, encode_record(&mock_resident()).unwrap())
            .await
            .unwrap();
        let state = manager.restore().await;
        assert_eq!(state.phase(), &SessionPhase::Unauthenticated);
    }

    // ── login ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_login_resolves_mock_identities() {
        let manager = restored(Arc::new(MemoryStore::new())).await;
        let outcome = manager.login("admin@society.com", "anything").await.unwrap();
        assert_eq!(outcome.role, UserRole::Administrator);
        assert_eq!(outcome.user_id, "1");
        manager.logout().await.unwrap();

        let outcome = manager.login("someone@else.org", "anything").await.unwrap();
        assert_eq!(outcome.role, UserRole::Resident);
        assert_eq!(manager.current_user().unwrap().flat(), Some("A-101"));
    }

    #[tokio::test]
    async fn test_login_marks_loading_while_in_flight() {
        let manager = Arc::new(SessionManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockVerifier::new("admin@society.com", Duration::from_millis(50))),
            options(),
        ));
        manager.restore().await;
        let mut rx = manager.subscribe();

        let task = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.login("admin@society.com", "pw").await })
        };

        rx.changed().await.unwrap();
        {
            let state = rx.borrow_and_update();
            assert!(state.loading());
            assert!(state.current_user().is_none());
            assert_eq!(state.screen(), Screen::Loading);
        }

        task.await.unwrap().unwrap();
        let state = manager.state();
        assert!(!state.loading());
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_then_restore_in_fresh_instance() {
        let store = Arc::new(MemoryStore::new());
        let first = restored(store.clone()).await;
        first.login("resident@society.com", "pw").await.unwrap();
        let expected = first.current_user().unwrap();

        let second = restored(store).await;
        assert_eq!(second.current_user(), Some(expected));
    }

    #[tokio::test]
    async fn test_login_rejection_keeps_previous_record() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "previous".into()).await.unwrap();

        let manager = manager_with(store.clone(), Arc::new(Rejecting(Duration::ZERO)));
        manager.restore().await;

        let err = manager.login("resident@society.com", "bad").await.unwrap_err();
        assert!(matches!(
            err,
            LoginError::Authentication(AuthenticationError::InvalidCredentials)
        ));

        let state = manager.state();
        assert!(state.current_user().is_none());
        assert!(!state.loading());
        assert_eq!(state.error(), Some(INVALID_CREDENTIALS));
        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let manager = Arc::new(manager_with(
            Arc::new(MemoryStore::new()),
            Arc::new(Rejecting(Duration::from_millis(50))),
        ));
        manager.restore().await;
        let _ = manager.login("a@b.c", "x").await;
        assert_eq!(manager.state().error(), Some(INVALID_CREDENTIALS));

        let mut rx = manager.subscribe();
        let retry = tokio::spawn({
            let manager = manager.clone();
            async move { manager.login("a@b.c", "x").await }
        });

        rx.changed().await.unwrap();
        {
            let state = rx.borrow_and_update();
            assert!(state.loading());
            assert!(state.error().is_none());
        }

        assert!(retry.await.unwrap().is_err());
        assert_eq!(manager.state().error(), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_login_timeout() {
        let manager = SessionManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NeverAnswers),
            SessionOptions {
                storage_key: KEY.into(),
                login_timeout: Some(Duration::from_millis(20)),
            },
        );
        manager.restore().await;

        let err = manager.login("admin@society.com", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::Timeout(_)));
        let state = manager.state();
        assert!(!state.loading());
        assert_eq!(state.error(), Some(LOGIN_TIMED_OUT));
        assert_eq!(state.phase(), &SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_storage_failure_is_distinct() {
        let manager = manager_with(
            Arc::new(ReadOnlyStore(MemoryStore::new())),
            Arc::new(MockVerifier::instant()),
        );
        manager.restore().await;

        let err = manager.login("admin@society.com", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::StorageWrite(_)));
        let state = manager.state();
        assert!(state.current_user().is_none());
        assert_eq!(state.error(), Some(crate::domain::error::SAVE_FAILED));
    }

    #[tokio::test]
    async fn test_login_before_restore_or_twice() {
        let manager = manager_with(Arc::new(MemoryStore::new()), Arc::new(MockVerifier::instant()));
        assert!(matches!(
            manager.login("admin@society.com", "pw").await,
            Err(LoginError::NotReady)
        ));
        assert_eq!(manager.state().phase(), &SessionPhase::Restoring);

        manager.restore().await;
        manager.login("admin@society.com", "pw").await.unwrap();
        assert!(matches!(
            manager.login("resident@society.com", "pw").await,
            Err(LoginError::AlreadyAuthenticated)
        ));
        assert!(manager.current_user().unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_concurrent_logins_are_serialized() {
        let manager = Arc::new(SessionManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockVerifier::new("admin@society.com", Duration::from_millis(20))),
            options(),
        ));
        manager.restore().await;

        let a = tokio::spawn({
            let m = manager.clone();
            async move { m.login("admin@society.com", "pw").await }
        });
        let b = tokio::spawn({
            let m = manager.clone();
            async move { m.login("resident@society.com", "pw").await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LoginError::AlreadyAuthenticated))));
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn test_login_completes_within_delay_bound() {
        let manager = SessionManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockVerifier::new("admin@society.com", Duration::from_millis(30))),
            options(),
        );
        manager.restore().await;

        let result = tokio::time::timeout(
            Duration::from_millis(500),
            manager.login("resident@society.com", "pw"),
        )
        .await
        .expect("login did not resolve");
        assert!(result.is_ok());
        assert!(!manager.is_loading());
    }

    // ── logout ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let manager = restored(store.clone()).await;
        manager.login("admin@society.com", "pw").await.unwrap();
        assert!(store.get(KEY).await.unwrap().is_some());

        for _ in 0..2 {
            manager.logout().await.unwrap();
            let state = manager.state();
            assert!(state.current_user().is_none());
            assert!(!state.loading());
            assert!(state.error().is_none());
        }
        assert!(store.get(KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_state_even_if_storage_fails() {
        let backing = MemoryStore::new();
        backing
            .set(KEY, encode_record(&mock_resident()).unwrap())
            .await
            .unwrap();
        let manager = manager_with(
            Arc::new(ReadOnlyStore(backing)),
            Arc::new(MockVerifier::instant()),
        );
        manager.restore().await;
        assert!(manager.state().is_authenticated());

        assert!(manager.logout().await.is_err());
        assert_eq!(manager.state().phase(), &SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_before_restore_leaves_restoring() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(KEY, encode_record(&mock_resident()).unwrap())
            .await
            .unwrap();
        let manager = manager_with(store.clone(), Arc::new(MockVerifier::instant()));

        manager.logout().await.unwrap();
        assert_eq!(manager.state().phase(), &SessionPhase::Restoring);
        assert!(store.get(KEY).await.unwrap().is_some());

        let state = manager.restore().await;
        assert_eq!(state.current_user().unwrap().flat(), Some("A-101"));
    }
}
