use std::sync::Arc;

use moderation_core::ModerationResult;

use crate::client::CampaignClient;
use crate::dispatcher::ActionDispatcher;
use crate::filter::FilterSpec;
use crate::machines::{CampaignAction, CampaignMachine, StateMachine};
use crate::models::Campaign;
use crate::sync::ListSynchronizer;

use super::{plan_transition, settle, BoardContext, RefreshPolicy};

/// Campaign review queue.
pub struct CampaignBoard<C: CampaignClient + 'static> {
    client: Arc<C>,
    list: ListSynchronizer<Campaign>,
    actions: ActionDispatcher<String>,
}

impl<C: CampaignClient + 'static> CampaignBoard<C> {
    pub const POLICY: RefreshPolicy = RefreshPolicy::OptimisticPatch;

    pub fn new(client: Arc<C>, ctx: &BoardContext) -> Self {
        Self {
            list: ctx.synchronizer::<Campaign>(client.clone(), FilterSpec::new()),
            actions: ctx.dispatcher::<Campaign>(),
            client,
        }
    }

    pub fn list(&self) -> &ListSynchronizer<Campaign> {
        &self.list
    }

    pub fn actions(&self) -> &ActionDispatcher<String> {
        &self.actions
    }

    pub async fn load(&self) -> bool {
        self.list.refetch().await
    }

    /// Campaign buttons stay disabled while any campaign action is in flight.
    pub fn is_busy(&self) -> bool {
        self.actions.any_pending()
    }

    pub fn available_actions(&self, id: &str) -> Vec<CampaignAction> {
        self.list
            .get(&id.to_string())
            .map(|c| CampaignMachine::available_actions(&c.status))
            .unwrap_or_default()
    }

    pub async fn approve(&self, id: &str) -> ModerationResult<()> {
        self.perform(id, CampaignAction::Approve).await
    }

    pub async fn reject(&self, id: &str) -> ModerationResult<()> {
        self.perform(id, CampaignAction::Reject).await
    }

    async fn perform(&self, id: &str, action: CampaignAction) -> ModerationResult<()> {
        let id = id.to_string();
        let target =
            plan_transition::<CampaignMachine, _>(&self.list, &id, |c| c.status.clone(), action)?;

        let client = &self.client;
        let list = &self.list;
        let key = &id;
        self.actions
            .dispatch(
                id.clone(),
                action,
                move || async move {
                    match action {
                        CampaignAction::Approve => client.approve(key).await,
                        CampaignAction::Reject => client.reject(key).await,
                    }
                },
                move |_| async move {
                    settle(Self::POLICY, list, key, |c| c.status = target).await;
                },
                |_| {},
            )
            .await
    }
}
