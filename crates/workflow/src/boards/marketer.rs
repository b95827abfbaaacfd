use std::sync::Arc;

use moderation_core::{ModerationError, ModerationResult};

use crate::client::MarketerClient;
use crate::dispatcher::ActionDispatcher;
use crate::filter::FilterSpec;
use crate::machines::{MarketerAction, MarketerMachine, ModerationAction, StateMachine};
use crate::models::Marketer;
use crate::sync::ListSynchronizer;

use super::{plan_transition, settle, BoardContext, RefreshPolicy};

/// Admin edit of a marketer's performance score. Shares the per-id lock
/// with verify and unverify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreUpdate(pub f64);

impl ModerationAction for ScoreUpdate {
    fn name(&self) -> &'static str {
        "update_score"
    }

    fn success_message(&self) -> &'static str {
        "Performance score updated"
    }

    fn failure_message(&self) -> &'static str {
        "Failed to update score"
    }
}

pub struct MarketerBoard<C: MarketerClient + 'static> {
    client: Arc<C>,
    list: ListSynchronizer<Marketer>,
    actions: ActionDispatcher<u64>,
}

impl<C: MarketerClient + 'static> MarketerBoard<C> {
    pub const POLICY: RefreshPolicy = RefreshPolicy::Refetch;

    pub fn new(client: Arc<C>, ctx: &BoardContext) -> Self {
        let defaults = FilterSpec::new().with_page_size(ctx.lists.marketer_page_size);
        Self {
            list: ctx.synchronizer::<Marketer>(client.clone(), defaults),
            actions: ctx.dispatcher::<Marketer>(),
            client,
        }
    }

    pub fn list(&self) -> &ListSynchronizer<Marketer> {
        &self.list
    }

    pub fn actions(&self) -> &ActionDispatcher<u64> {
        &self.actions
    }

    pub async fn load(&self) -> bool {
        self.list.refetch().await
    }

    pub fn available_actions(&self, id: u64) -> Vec<MarketerAction> {
        self.list
            .get(&id)
            .map(|m| MarketerMachine::available_actions(&m.status()))
            .unwrap_or_default()
    }

    pub async fn verify(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, MarketerAction::Verify).await
    }

    pub async fn unverify(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, MarketerAction::Unverify).await
    }

    async fn perform(&self, id: u64, action: MarketerAction) -> ModerationResult<()> {
        plan_transition::<MarketerMachine, _>(&self.list, &id, Marketer::status, action)?;

        let client = &self.client;
        let list = &self.list;
        self.actions
            .dispatch(
                id,
                action,
                move || async move {
                    match action {
                        MarketerAction::Verify => client.verify(id).await,
                        MarketerAction::Unverify => client.unverify(id).await,
                    }
                },
                move |_| async move {
                    settle(Self::POLICY, list, &id, |_| {}).await;
                },
                |_| {},
            )
            .await
    }

    /// Set the performance score of marketer `id`. The score must be a
    /// finite, non-negative number.
    pub async fn update_score(&self, id: u64, score: f64) -> ModerationResult<()> {
        if !score.is_finite() || score < 0.0 {
            return Err(ModerationError::Validation(format!(
                "performance score must be a non-negative number, got {score}"
            )));
        }
        if self.list.get(&id).is_none() {
            return Err(ModerationError::Validation(format!(
                "marketer {id} is not in the current list"
            )));
        }

        let client = &self.client;
        let list = &self.list;
        self.actions
            .dispatch(
                id,
                ScoreUpdate(score),
                move || async move { client.update_performance_score(id, score).await },
                move |_| async move {
                    settle(Self::POLICY, list, &id, |_| {}).await;
                },
                |_| {},
            )
            .await
    }
}
