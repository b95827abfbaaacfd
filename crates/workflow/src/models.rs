//! Moderated resource types as the remote API reports them.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moderation_core::EntityKind;

use crate::machines::{CampaignStatus, CompanyStatus, MarketerStatus, WithdrawalStatus};

/// A record held in a list snapshot, addressed by its id.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;
}

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payout: f64,
    pub status: CampaignStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl Entity for Campaign {
    type Id = String;
    const KIND: EntityKind = EntityKind::Campaign;

    fn id(&self) -> String {
        self.id.clone()
    }
}

// ─── Company ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    #[serde(rename = "campanyName")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_email: String,
    pub is_verified: bool,
    /// Explicit status, when the endpoint reports one.
    #[serde(default, rename = "status")]
    pub reported_status: Option<CompanyStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn status(&self) -> CompanyStatus {
        self.reported_status
            .clone()
            .unwrap_or_else(|| CompanyStatus::from_verified(self.is_verified))
    }
}

impl Entity for Company {
    type Id = u64;
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> u64 {
        self.id
    }
}

// ─── Marketer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketer {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    pub is_verified: bool,
    #[serde(default)]
    pub performance_score: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Marketer {
    pub fn status(&self) -> MarketerStatus {
        MarketerStatus::from_verified(self.is_verified)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Marketer {
    type Id = u64;
    const KIND: EntityKind = EntityKind::Marketer;

    fn id(&self) -> u64 {
        self.id
    }
}

// ─── Withdrawal ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: u64,
    pub marketer_id: u64,
    #[serde(default)]
    pub marketer_name: Option<String>,
    pub amount: f64,
    pub status: WithdrawalStatus,
    pub request_date: DateTime<Utc>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl Entity for WithdrawalRequest {
    type Id = u64;
    const KIND: EntityKind = EntityKind::Withdrawal;

    fn id(&self) -> u64 {
        self.id
    }
}
