use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use moderation_core::{ModerationResult, RemoteError};

use crate::client::{CompanyClient, CompanyScope, ListSource};
use crate::dispatcher::ActionDispatcher;
use crate::filter::FilterSpec;
use crate::machines::{CompanyAction, CompanyMachine, StateMachine};
use crate::models::Company;
use crate::sync::ListSynchronizer;

use super::{plan_transition, settle, BoardContext, RefreshPolicy};

pub const SEARCH_KEY: &str = "SearchKeyword";

/// Lists companies from the endpoint of the selected scope.
struct ScopedCompanies<C> {
    client: Arc<C>,
    scope: Mutex<CompanyScope>,
}

#[async_trait]
impl<C: CompanyClient + 'static> ListSource<Company> for ScopedCompanies<C> {
    async fn list(&self, filter: &FilterSpec) -> Result<Vec<Company>, RemoteError> {
        let scope = *self.scope.lock();
        match scope {
            CompanyScope::All => self.client.list(scope, filter).await,
            _ => self.client.list(scope, &FilterSpec::new()).await,
        }
    }
}

/// Company verification desk with Pending, Verified and All tabs.
pub struct CompanyBoard<C: CompanyClient + 'static> {
    client: Arc<C>,
    source: Arc<ScopedCompanies<C>>,
    list: ListSynchronizer<Company>,
    actions: ActionDispatcher<u64>,
}

impl<C: CompanyClient + 'static> CompanyBoard<C> {
    pub const POLICY: RefreshPolicy = RefreshPolicy::Refetch;

    pub fn new(client: Arc<C>, ctx: &BoardContext) -> Self {
        let source = Arc::new(ScopedCompanies {
            client: client.clone(),
            scope: Mutex::new(CompanyScope::default()),
        });
        let defaults = FilterSpec::new()
            .with_page_size(ctx.lists.company_page_size)
            .with(SEARCH_KEY, "");
        Self {
            list: ctx.synchronizer::<Company>(source.clone(), defaults),
            actions: ctx.dispatcher::<Company>(),
            source,
            client,
        }
    }

    pub fn list(&self) -> &ListSynchronizer<Company> {
        &self.list
    }

    pub fn actions(&self) -> &ActionDispatcher<u64> {
        &self.actions
    }

    pub fn scope(&self) -> CompanyScope {
        *self.source.scope.lock()
    }

    pub async fn load(&self) -> bool {
        self.list.refetch().await
    }

    /// Switch tabs. The filter goes back to its defaults and the new
    /// listing is fetched; a response still in flight for the old tab is
    /// discarded on arrival.
    pub async fn set_scope(&self, scope: CompanyScope) -> bool {
        *self.source.scope.lock() = scope;
        info!(scope = ?scope, "Company scope changed");
        self.list.reset_filter().await
    }

    pub fn available_actions(&self, id: u64) -> Vec<CompanyAction> {
        self.list
            .get(&id)
            .map(|c| CompanyMachine::available_actions(&c.status()))
            .unwrap_or_default()
    }

    pub async fn approve(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, CompanyAction::Approve).await
    }

    pub async fn reject(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, CompanyAction::Reject).await
    }

    pub async fn verify(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, CompanyAction::Verify).await
    }

    pub async fn suspend(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, CompanyAction::Suspend).await
    }

    pub async fn reactivate(&self, id: u64) -> ModerationResult<()> {
        self.perform(id, CompanyAction::Reactivate).await
    }

    async fn perform(&self, id: u64, action: CompanyAction) -> ModerationResult<()> {
        plan_transition::<CompanyMachine, _>(&self.list, &id, Company::status, action)?;

        let client = &self.client;
        let list = &self.list;
        self.actions
            .dispatch(
                id,
                action,
                move || async move {
                    match action {
                        CompanyAction::Approve => client.approve(id).await,
                        CompanyAction::Reject => client.reject(id).await,
                        CompanyAction::Verify => client.verify(id).await,
                        CompanyAction::Suspend => client.suspend(id).await,
                        CompanyAction::Reactivate => client.reactivate(id).await,
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
