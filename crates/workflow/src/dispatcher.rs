//! Per-id serialization of mutating moderation actions.
//!
//! A resource id is locked from the moment an action is accepted until the
//! remote call settles. While locked, any further action on the same id is
//! refused with `Conflict` without reaching the remote side, whichever action
//! it is. The lock is held by a guard, so it is released on success, failure,
//! panic, and when the dispatch future is dropped mid-flight.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashSet;
use tracing::{debug, info, warn};

use moderation_core::{EntityKind, ModerationError, ModerationResult};

use crate::machines::ModerationAction;
use crate::notify::{NoticeKind, NotificationSink};
use crate::session::SessionContext;

/// Ids with an in-flight action.
pub struct LockSet<K: Eq + Hash> {
    ids: DashSet<K>,
}

impl<K: Eq + Hash + Clone> LockSet<K> {
    pub fn new() -> Self {
        Self { ids: DashSet::new() }
    }

    /// Lock `id`, or `None` when it is already locked.
    pub fn try_acquire(&self, id: K) -> Option<LockGuard<'_, K>> {
        if self.ids.insert(id.clone()) {
            Some(LockGuard { ids: &self.ids, id })
        } else {
            None
        }
    }

    pub fn contains(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<K> {
        self.ids.iter().map(|id| id.key().clone()).collect()
    }
}

impl<K: Eq + Hash + Clone> Default for LockSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases its id on drop.
pub struct LockGuard<'a, K: Eq + Hash> {
    ids: &'a DashSet<K>,
    id: K,
}

impl<K: Eq + Hash> Drop for LockGuard<'_, K> {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}

/// Runs mutating actions for one entity kind, at most one per id.
pub struct ActionDispatcher<K: Eq + Hash> {
    kind: EntityKind,
    locks: LockSet<K>,
    notifier: Arc<dyn NotificationSink>,
    session: Option<Arc<SessionContext>>,
}

impl<K> ActionDispatcher<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    pub fn new(kind: EntityKind, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            kind,
            locks: LockSet::new(),
            notifier,
            session: None,
        }
    }

    /// Route `Auth` failures to `session` for teardown.
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Pending indicator for `id`.
    pub fn is_pending(&self, id: &K) -> bool {
        self.locks.contains(id)
    }

    pub fn any_pending(&self) -> bool {
        !self.locks.is_empty()
    }

    pub fn pending_ids(&self) -> Vec<K> {
        self.locks.ids()
    }

    /// Run `operation` for `id` unless `id` already has an action in flight.
    ///
    /// On success `on_success` runs after the lock is released, then a success
    /// notice is emitted. On failure `on_failure` runs, `Auth` errors are handed
    /// to the session, and an error notice is emitted. Nothing is assumed to
    /// have changed remotely when the operation fails.
    pub async fn dispatch<A, T, E, Op, Fut, S, SFut, F>(
        &self,
        id: K,
        action: A,
        operation: Op,
        on_success: S,
        on_failure: F,
    ) -> ModerationResult<T>
    where
        A: ModerationAction,
        E: Into<ModerationError>,
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T) -> SFut,
        SFut: Future<Output = ()>,
        F: FnOnce(&ModerationError),
    {
        let kind = self.kind.as_str();

        let Some(guard) = self.locks.try_acquire(id.clone()) else {
            debug!(kind, %id, action = action.name(), "Action refused, id already in flight");
            metrics::counter!("moderation.dispatch.refused", "kind" => kind).increment(1);
            return Err(ModerationError::Conflict(format!("{} {}", kind, id)));
        };

        info!(kind, %id, action = action.name(), "Action dispatched");
        metrics::counter!("moderation.dispatch.accepted", "kind" => kind).increment(1);

        let result = operation().await.map_err(Into::into);
        drop(guard);

        match result {
            Ok(value) => {
                info!(kind, %id, action = action.name(), "Action succeeded");
                metrics::counter!("moderation.dispatch.succeeded", "kind" => kind).increment(1);
                on_success(&value).await;
                self.notifier
                    .notify(NoticeKind::Success, action.success_message());
                Ok(value)
            }
            Err(err) => {
                warn!(kind, %id, action = action.name(), error = %err, "Action failed");
                metrics::counter!("moderation.dispatch.failed", "kind" => kind).increment(1);
                on_failure(&err);
                if let Some(session) = &self.session {
                    session.observe(&err);
                }
                self.notifier
                    .notify(NoticeKind::Error, action.failure_message());
                Err(err)
            }
        }
    }
}
