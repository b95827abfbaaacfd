//! Moderation boards: one list view per entity kind.
//!
//! A board composes a `ListSynchronizer` with an `ActionDispatcher` and the
//! kind's remote client. Every action is checked against the kind's state
//! machine before dispatch, then settled according to the board's
//! `RefreshPolicy`:
//!
//! | Board      | Policy           |
//! |------------|------------------|
//! | Campaign   | `OptimisticPatch` |
//! | Company    | `Refetch`        |
//! | Marketer   | `Refetch`        |
//! | Withdrawal | `Refetch`        |
//!
//! Campaign moderation patches the status in place. The other kinds refetch
//! because the server computes derived fields (verification flags, payout
//! state) that cannot be predicted locally.

pub mod campaign;
pub mod company;
pub mod marketer;
pub mod withdrawal;

use std::sync::Arc;

use tracing::warn;

use moderation_core::config::ListConfig;
use moderation_core::{ModerationConfig, ModerationError, ModerationResult};

use crate::client::ListSource;
use crate::dispatcher::ActionDispatcher;
use crate::filter::FilterSpec;
use crate::machines::StateMachine;
use crate::models::Entity;
use crate::notify::NotificationSink;
use crate::session::SessionContext;
use crate::sync::ListSynchronizer;

pub use campaign::CampaignBoard;
pub use company::CompanyBoard;
pub use marketer::MarketerBoard;
pub use withdrawal::WithdrawalBoard;

/// How a board brings its snapshot up to date after a successful action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Write the expected status into the snapshot; no list request.
    OptimisticPatch,
    /// Re-issue the list query for the current filter.
    Refetch,
}

/// Collaborators shared by every board of one console session.
#[derive(Clone)]
pub struct BoardContext {
    pub notifier: Arc<dyn NotificationSink>,
    pub session: Option<Arc<SessionContext>>,
    pub lists: ListConfig,
}

impl BoardContext {
    pub fn new(notifier: Arc<dyn NotificationSink>, config: &ModerationConfig) -> Self {
        Self {
            notifier,
            session: None,
            lists: config.lists.clone(),
        }
    }

    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub(crate) fn dispatcher<E: Entity>(&self) -> ActionDispatcher<E::Id> {
        let dispatcher = ActionDispatcher::new(E::KIND, self.notifier.clone());
        match &self.session {
            Some(session) => dispatcher.with_session(session.clone()),
            None => dispatcher,
        }
    }

    pub(crate) fn synchronizer<E: Entity>(
        &self,
        source: Arc<dyn ListSource<E>>,
        defaults: FilterSpec,
    ) -> ListSynchronizer<E> {
        let list = ListSynchronizer::new(source, defaults);
        match &self.session {
            Some(session) => list.with_session(session.clone()),
            None => list,
        }
    }
}

/// Look `id` up in the snapshot and check `action` against machine `M`.
/// Returns the status the action is expected to lead to.
pub(crate) fn plan_transition<M, E>(
    list: &ListSynchronizer<E>,
    id: &E::Id,
    status_of: impl FnOnce(&E) -> M::Status,
    action: M::Action,
) -> ModerationResult<M::Status>
where
    M: StateMachine,
    E: Entity,
{
    let planned = list
        .get(id)
        .ok_or_else(|| {
            ModerationError::Validation(format!("{} {} is not in the current list", E::KIND, id))
        })
        .and_then(|entity| M::validate_transition(&status_of(&entity), action));

    if let Err(err) = &planned {
        warn!(kind = E::KIND.as_str(), %id, error = %err, "Action refused before dispatch");
        metrics::counter!("moderation.dispatch.refused", "kind" => E::KIND.as_str()).increment(1);
    }
    planned
}

/// Bring the snapshot up to date after a successful action on `id`.
pub(crate) async fn settle<E: Entity>(
    policy: RefreshPolicy,
    list: &ListSynchronizer<E>,
    id: &E::Id,
    patch: impl FnOnce(&mut E),
) {
    match policy {
        RefreshPolicy::OptimisticPatch => {
            list.patch_entity(id, patch);
        }
        RefreshPolicy::Refetch => {
            list.refetch().await;
        }
    }
}
