//! Filter-driven list synchronization against the remote system of record.
//!
//! Every list request is tagged with a generation number taken at issue
//! time. A response is applied only when its generation is still the latest
//! one issued; anything older is dropped on arrival. The underlying request
//! is never cancelled.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use moderation_core::{ErrorClass, EntityKind, ModerationError, RemoteError};

use crate::client::ListSource;
use crate::filter::{FilterPatch, FilterSpec};
use crate::models::Entity;
use crate::session::SessionContext;

/// Outcome of the latest applied list request.
#[derive(Debug, Clone, PartialEq)]
pub enum ListCondition {
    /// Nothing applied yet.
    Idle,
    Ready,
    /// The remote side found nothing for the current filter. The snapshot is empty.
    NoMatches(String),
    /// The load failed. The previous snapshot is kept; call `refetch` to retry.
    Failed { class: ErrorClass, message: String },
}

impl ListCondition {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ListCondition::Failed { .. })
    }

    /// Message for the error slot, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ListCondition::NoMatches(message) | ListCondition::Failed { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

struct SyncState<E> {
    filter: FilterSpec,
    snapshot: Vec<E>,
    loading: bool,
    condition: ListCondition,
    issued: u64,
}

/// Owns one view's filter and the collection it produced.
pub struct ListSynchronizer<E: Entity> {
    source: Arc<dyn ListSource<E>>,
    defaults: FilterSpec,
    state: Mutex<SyncState<E>>,
    session: Option<Arc<SessionContext>>,
}

impl<E: Entity> ListSynchronizer<E> {
    pub fn new(source: Arc<dyn ListSource<E>>, defaults: FilterSpec) -> Self {
        Self {
            source,
            state: Mutex::new(SyncState {
                filter: defaults.clone(),
                snapshot: Vec::new(),
                loading: false,
                condition: ListCondition::Idle,
                issued: 0,
            }),
            defaults,
            session: None,
        }
    }

    /// Route `Auth` failures to `session` for teardown.
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn filter(&self) -> FilterSpec {
        self.state.lock().filter.clone()
    }

    pub fn snapshot(&self) -> Vec<E> {
        self.state.lock().snapshot.clone()
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.state
            .lock()
            .snapshot
            .iter()
            .find(|entity| &entity.id() == id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn condition(&self) -> ListCondition {
        self.state.lock().condition.clone()
    }

    /// Latest issued generation.
    pub fn generation(&self) -> u64 {
        self.state.lock().issued
    }

    /// Merge `patch` into the filter, go back to the first page, and refetch.
    pub async fn set_filter(&self, patch: FilterPatch) -> bool {
        self.state.lock().filter.apply(patch);
        self.refetch().await
    }

    /// Change only the page cursor and refetch.
    pub async fn set_page(&self, page: u32) -> bool {
        self.state.lock().filter.set_page(page);
        self.refetch().await
    }

    /// Replace the whole filter and refetch.
    pub async fn replace_filter(&self, filter: FilterSpec) -> bool {
        self.state.lock().filter = filter;
        self.refetch().await
    }

    /// Restore the view's default filter and refetch.
    pub async fn reset_filter(&self) -> bool {
        self.replace_filter(self.defaults.clone()).await
    }

    /// Issue a list query for the current filter.
    ///
    /// Returns `false` when the response was stale and discarded.
    pub async fn refetch(&self) -> bool {
        let kind = E::KIND.as_str();
        let (generation, filter) = {
            let mut state = self.state.lock();
            state.issued += 1;
            state.loading = true;
            (state.issued, state.filter.clone())
        };
        debug!(kind, generation, page = filter.page(), "List query issued");

        let result = self.source.list(&filter).await;

        let (current, auth_failure) = {
            let mut state = self.state.lock();
            if generation == state.issued {
                state.loading = false;
                (true, self.apply(&mut state, result))
            } else {
                debug!(kind, generation, latest = state.issued, "Stale list result discarded");
                metrics::counter!("moderation.list.stale_discarded", "kind" => kind).increment(1);
                // A rejected credential still ends the session.
                (false, result.err().filter(|err| err.class == ErrorClass::Auth))
            }
        };

        if let (Some(session), Some(err)) = (&self.session, auth_failure) {
            session.observe(&ModerationError::from(err));
        }
        current
    }

    /// Transform one entity of the snapshot in place. Returns `false` when
    /// `id` is not in the snapshot.
    pub fn patch_entity(&self, id: &E::Id, updater: impl FnOnce(&mut E)) -> bool {
        let mut state = self.state.lock();
        match state.snapshot.iter_mut().find(|entity| &entity.id() == id) {
            Some(entity) => {
                updater(entity);
                debug!(kind = E::KIND.as_str(), %id, "Snapshot entity patched");
                true
            }
            None => false,
        }
    }

    /// Apply a current-generation result. Hands back auth failures so the
    /// caller can tear the session down outside the state lock.
    fn apply(
        &self,
        state: &mut SyncState<E>,
        result: Result<Vec<E>, RemoteError>,
    ) -> Option<RemoteError> {
        let kind = E::KIND;
        match result {
            Ok(items) => {
                info!(kind = kind.as_str(), count = items.len(), "List snapshot replaced");
                state.snapshot = items;
                state.condition = ListCondition::Ready;
                None
            }
            Err(err) if err.class == ErrorClass::NotFound => {
                info!(kind = kind.as_str(), "No matching resources");
                state.snapshot.clear();
                state.condition = ListCondition::NoMatches(format!(
                    "No {} found matching your criteria.",
                    kind.plural()
                ));
                None
            }
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "List load failed");
                let message = match err.class {
                    ErrorClass::Server => format!(
                        "Server error occurred while fetching {}. Please try again later.",
                        kind.plural()
                    ),
                    ErrorClass::Network => {
                        "Network error. Please check your connection.".to_string()
                    }
                    _ => format!("Failed to load {}.", kind.plural()),
                };
                state.condition = ListCondition::Failed {
                    class: err.class,
                    message,
                };
                (err.class == ErrorClass::Auth).then_some(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::STATUS_KEY;
    use crate::machines::WithdrawalStatus;
    use crate::models::WithdrawalRequest;
    use crate::notify::RecordingNavigator;
    use crate::session::tests::admin_token;
    use crate::session::{CredentialStore, MemoryCredentialStore};
    use moderation_core::config::SessionConfig;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn withdrawal(id: u64, status: WithdrawalStatus) -> WithdrawalRequest {
        WithdrawalRequest {
            id,
            marketer_id: 7,
            marketer_name: None,
            amount: 120.0,
            status,
            request_date: Utc::now(),
            bank_name: None,
            account_number: None,
            holder_name: None,
            iban: None,
            rejection_reason: None,
            admin_notes: None,
            transaction_id: None,
        }
    }

    /// Answers from a queue of canned results and records each filter.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<WithdrawalRequest>, RemoteError>>>,
        filters: Mutex<Vec<FilterSpec>>,
    }

    impl ScriptedSource {
        fn push(&self, response: Result<Vec<WithdrawalRequest>, RemoteError>) {
            self.responses.lock().push_back(response);
        }

        fn calls(&self) -> usize {
            self.filters.lock().len()
        }
    }

    #[async_trait]
    impl ListSource<WithdrawalRequest> for ScriptedSource {
        async fn list(&self, filter: &FilterSpec) -> Result<Vec<WithdrawalRequest>, RemoteError> {
            self.filters.lock().push(filter.clone());
            self.responses.lock().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    type Reply = Result<Vec<WithdrawalRequest>, RemoteError>;

    /// Holds each response until the test releases it, keyed by status filter.
    #[derive(Default)]
    struct GatedSource {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ListSource<WithdrawalRequest> for GatedSource {
        async fn list(&self, filter: &FilterSpec) -> Result<Vec<WithdrawalRequest>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = filter
                .get(STATUS_KEY)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let gate = self.gates.lock().remove(&key);
            match gate {
                Some(gate) => gate
                    .await
                    .unwrap_or_else(|_| Err(RemoteError::network("response dropped"))),
                None => Ok(Vec::new()),
            }
        }
    }

    fn defaults() -> FilterSpec {
        FilterSpec::new().with_page_size(20).with(STATUS_KEY, "Pending")
    }

    fn synchronizer(source: Arc<ScriptedSource>) -> ListSynchronizer<WithdrawalRequest> {
        ListSynchronizer::new(source, defaults())
    }

    #[tokio::test]
    async fn test_set_filter_resets_page_and_refetches_once() {
        let source = Arc::new(ScriptedSource::default());
        let sync = synchronizer(source.clone());
        sync.set_page(3).await;
        assert_eq!(source.calls(), 1);

        assert!(sync.set_filter(FilterPatch::new().set("MinAmount", 50.0)).await);
        assert_eq!(source.calls(), 2);

        let sent = source.filters.lock().last().cloned().unwrap();
        assert_eq!(sent.page(), 1);
        assert_eq!(sent.get("MinAmount").map(|v| v.to_string()), Some("50".to_string()));
        assert_eq!(sent.get(STATUS_KEY).map(|v| v.to_string()), Some("Pending".to_string()));
        assert_eq!(sync.generation(), 2);
    }

    #[tokio::test]
    async fn test_success_replaces_snapshot_and_clears_error() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Err(RemoteError::server("boom")));
        source.push(Ok(vec![withdrawal(1, WithdrawalStatus::Pending)]));
        let sync = synchronizer(source.clone());

        sync.refetch().await;
        assert!(sync.condition().is_retryable());

        sync.refetch().await;
        assert_eq!(sync.condition(), ListCondition::Ready);
        assert_eq!(sync.snapshot().len(), 1);
        assert!(!sync.is_loading());
    }

    #[tokio::test]
    async fn test_not_found_clears_snapshot() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(vec![withdrawal(1, WithdrawalStatus::Pending)]));
        source.push(Err(RemoteError::not_found("404")));
        let sync = synchronizer(source.clone());

        sync.refetch().await;
        sync.set_filter(FilterPatch::new().set(STATUS_KEY, "Failed")).await;

        assert!(sync.snapshot().is_empty());
        assert_eq!(
            sync.condition().message(),
            Some("No withdrawal requests found matching your criteria.")
        );
        assert!(!sync.condition().is_retryable());
    }

    #[tokio::test]
    async fn test_transient_failure_preserves_snapshot() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(vec![
            withdrawal(1, WithdrawalStatus::Pending),
            withdrawal(2, WithdrawalStatus::Pending),
        ]));
        source.push(Err(RemoteError::network("offline")));
        let sync = synchronizer(source.clone());

        sync.refetch().await;
        sync.refetch().await;

        assert_eq!(sync.snapshot().len(), 2);
        assert_eq!(
            sync.condition(),
            ListCondition::Failed {
                class: ErrorClass::Network,
                message: "Network error. Please check your connection.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_stale_generation_is_discarded() {
        let (pending_tx, pending_rx) = oneshot::channel();
        let (approved_tx, approved_rx) = oneshot::channel();
        let source = Arc::new(GatedSource::default());
        source.gates.lock().insert("Pending".to_string(), pending_rx);
        source.gates.lock().insert("Approved".to_string(), approved_rx);
        let sync: ListSynchronizer<WithdrawalRequest> =
            ListSynchronizer::new(source.clone(), FilterSpec::new());
        let s = &sync;

        let first = async move {
            s.set_filter(FilterPatch::new().set(STATUS_KEY, "Pending"))
                .await
        };
        let second = async move {
            tokio::task::yield_now().await;
            s.set_filter(FilterPatch::new().set(STATUS_KEY, "Approved"))
                .await
        };
        let responder = async move {
            while s.generation() < 2 {
                tokio::task::yield_now().await;
            }
            let _ = approved_tx.send(Ok(vec![withdrawal(20, WithdrawalStatus::Approved)]));
            while s.is_loading() {
                tokio::task::yield_now().await;
            }
            // The older response arrives last.
            let _ = pending_tx.send(Ok(vec![withdrawal(10, WithdrawalStatus::Pending)]));
        };

        let (first, second, ()) = tokio::join!(first, second, responder);
        assert!(!first);
        assert!(second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, WithdrawalStatus::Approved);
        assert_eq!(
            sync.filter().get(STATUS_KEY).map(|v| v.to_string()),
            Some("Approved".to_string())
        );
    }

    #[tokio::test]
    async fn test_patch_entity_in_place() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(vec![withdrawal(5, WithdrawalStatus::Pending)]));
        let sync = synchronizer(source.clone());
        sync.refetch().await;

        assert!(sync.patch_entity(&5, |w| w.status = WithdrawalStatus::Processing));
        assert!(!sync.patch_entity(&6, |w| w.status = WithdrawalStatus::Failed));
        assert_eq!(sync.get(&5).unwrap().status, WithdrawalStatus::Processing);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let source = Arc::new(ScriptedSource::default());
        let sync = synchronizer(source.clone());
        sync.set_filter(FilterPatch::new().set(STATUS_KEY, "all").set("MarketerId", 3i64))
            .await;
        sync.reset_filter().await;
        assert_eq!(sync.filter(), defaults());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_auth_failure_still_ends_session() {
        let (pending_tx, pending_rx) = oneshot::channel();
        let (approved_tx, approved_rx) = oneshot::channel();
        let source = Arc::new(GatedSource::default());
        source.gates.lock().insert("Pending".to_string(), pending_rx);
        source.gates.lock().insert("Approved".to_string(), approved_rx);

        let store = Arc::new(MemoryCredentialStore::with_token(admin_token()));
        let navigator = Arc::new(RecordingNavigator::new());
        let session = Arc::new(SessionContext::initialize(
            store.clone(),
            navigator.clone(),
            &SessionConfig::default(),
        ));
        let sync: ListSynchronizer<WithdrawalRequest> =
            ListSynchronizer::new(source.clone(), FilterSpec::new()).with_session(session.clone());
        let s = &sync;

        let first = async move {
            s.set_filter(FilterPatch::new().set(STATUS_KEY, "Pending"))
                .await
        };
        let second = async move {
            tokio::task::yield_now().await;
            s.set_filter(FilterPatch::new().set(STATUS_KEY, "Approved"))
                .await
        };
        let responder = async move {
            while s.generation() < 2 {
                tokio::task::yield_now().await;
            }
            let _ = approved_tx.send(Ok(Vec::new()));
            while s.is_loading() {
                tokio::task::yield_now().await;
            }
            let _ = pending_tx.send(Err(RemoteError::auth("401 expired")));
        };

        let (first, second, ()) = tokio::join!(first, second, responder);
        assert!(!first);
        assert!(second);

        // The snapshot keeps the current generation's result.
        assert_eq!(sync.condition(), ListCondition::Ready);
        assert!(!session.is_authenticated());
        assert!(store.get().is_none());
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
    }
}
