use std::sync::Arc;

use tracing::debug;

use moderation_core::ModerationResult;

use crate::client::WithdrawalClient;
use crate::dispatcher::ActionDispatcher;
use crate::filter::{FilterSpec, STATUS_KEY};
use crate::machines::{StateMachine, WithdrawalAction, WithdrawalDecision, WithdrawalMachine};
use crate::models::WithdrawalRequest;
use crate::sync::ListSynchronizer;

use super::{plan_transition, settle, BoardContext, RefreshPolicy};

/// Payout queue. Approving needs the bank transaction reference, rejecting
/// needs a reason; both are checked before the request is locked.
pub struct WithdrawalBoard<C: WithdrawalClient + 'static> {
    client: Arc<C>,
    list: ListSynchronizer<WithdrawalRequest>,
    actions: ActionDispatcher<u64>,
}

impl<C: WithdrawalClient + 'static> WithdrawalBoard<C> {
    pub const POLICY: RefreshPolicy = RefreshPolicy::Refetch;

    pub fn new(client: Arc<C>, ctx: &BoardContext) -> Self {
        let defaults = FilterSpec::new()
            .with_page_size(ctx.lists.withdrawal_page_size)
            .with(STATUS_KEY, ctx.lists.withdrawal_default_status.as_str());
        Self {
            list: ctx.synchronizer::<WithdrawalRequest>(client.clone(), defaults),
            actions: ctx.dispatcher::<WithdrawalRequest>(),
            client,
        }
    }

    pub fn list(&self) -> &ListSynchronizer<WithdrawalRequest> {
        &self.list
    }

    pub fn actions(&self) -> &ActionDispatcher<u64> {
        &self.actions
    }

    pub async fn load(&self) -> bool {
        self.list.refetch().await
    }

    pub fn available_actions(&self, id: u64) -> Vec<WithdrawalAction> {
        self.list
            .get(&id)
            .map(|w| WithdrawalMachine::available_actions(&w.status))
            .unwrap_or_default()
    }

    pub async fn approve(&self, id: u64, decision: &WithdrawalDecision) -> ModerationResult<()> {
        self.perform(id, WithdrawalAction::Approve, decision).await
    }

    pub async fn reject(&self, id: u64, decision: &WithdrawalDecision) -> ModerationResult<()> {
        self.perform(id, WithdrawalAction::Reject, decision).await
    }

    async fn perform(
        &self,
        id: u64,
        action: WithdrawalAction,
        decision: &WithdrawalDecision,
    ) -> ModerationResult<()> {
        if let Err(err) = decision.check(action) {
            debug!(%id, action = ?action, error = %err, "Withdrawal decision incomplete");
            return Err(err);
        }
        plan_transition::<WithdrawalMachine, _>(&self.list, &id, |w| w.status.clone(), action)?;

        let decision = WithdrawalDecision {
            is_approved: action == WithdrawalAction::Approve,
            ..decision.clone()
        };
        let client = &self.client;
        let list = &self.list;
        let body = &decision;
        self.actions
            .dispatch(
                id,
                action,
                move || async move {
                    match action {
                        WithdrawalAction::Approve => client.approve(id, body).await,
                        WithdrawalAction::Reject => client.reject(id, body).await,
                    }
                },
                move |_| async move {
                    settle(Self::POLICY, list, &id, |_| {}).await;
                },
                |_| {},
            )
            .await
    }
}
