//! Remote system-of-record contracts, one trait per entity kind.
//!
//! Implementations own the transport (base URL, bearer header, timeouts,
//! response envelope); this crate only sees typed results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use moderation_core::RemoteError;

use crate::filter::FilterSpec;
use crate::machines::WithdrawalDecision;
use crate::models::{Campaign, Company, Marketer, WithdrawalRequest};

/// List query for one entity kind.
#[async_trait]
pub trait ListSource<E: Send>: Send + Sync {
    async fn list(&self, filter: &FilterSpec) -> Result<Vec<E>, RemoteError>;
}

#[async_trait]
pub trait CampaignClient: ListSource<Campaign> {
    async fn approve(&self, id: &str) -> Result<(), RemoteError>;
    async fn reject(&self, id: &str) -> Result<(), RemoteError>;
}

/// Which company listing endpoint backs a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyScope {
    #[default]
    Pending,
    Verified,
    /// Full directory; the only scope that honours filter fields.
    All,
}

#[async_trait]
pub trait CompanyClient: Send + Sync {
    async fn list(
        &self,
        scope: CompanyScope,
        filter: &FilterSpec,
    ) -> Result<Vec<Company>, RemoteError>;
    async fn approve(&self, id: u64) -> Result<(), RemoteError>;
    async fn reject(&self, id: u64) -> Result<(), RemoteError>;
    async fn verify(&self, id: u64) -> Result<(), RemoteError>;
    async fn suspend(&self, id: u64) -> Result<(), RemoteError>;
    async fn reactivate(&self, id: u64) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait MarketerClient: ListSource<Marketer> {
    async fn verify(&self, id: u64) -> Result<(), RemoteError>;
    async fn unverify(&self, id: u64) -> Result<(), RemoteError>;
    async fn update_performance_score(&self, id: u64, score: f64) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait WithdrawalClient: ListSource<WithdrawalRequest> {
    async fn approve(&self, id: u64, decision: &WithdrawalDecision) -> Result<(), RemoteError>;
    async fn reject(&self, id: u64, decision: &WithdrawalDecision) -> Result<(), RemoteError>;
}
