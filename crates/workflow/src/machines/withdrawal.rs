//! Withdrawal requests: Pending, Processing, Approved, Completed, Rejected, Failed.
//!
//! Only `Pending` requests are actionable from the console. Processing,
//! Completed and Failed are driven by the payout pipeline on the server.

use serde::{Deserialize, Serialize};

use moderation_core::{EntityKind, ModerationError, ModerationResult};

use super::{ModerationAction, StateMachine, StatusLabel};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Approved,
    Completed,
    Rejected,
    Failed,
    Other(String),
}

impl StatusLabel for WithdrawalStatus {
    fn label(&self) -> &str {
        match self {
            WithdrawalStatus::Pending => "Pending",
            WithdrawalStatus::Processing => "Processing",
            WithdrawalStatus::Approved => "Approved",
            WithdrawalStatus::Completed => "Completed",
            WithdrawalStatus::Rejected => "Rejected",
            WithdrawalStatus::Failed => "Failed",
            WithdrawalStatus::Other(raw) => raw,
        }
    }

    fn is_recognized(&self) -> bool {
        !matches!(self, WithdrawalStatus::Other(_))
    }
}

impl From<String> for WithdrawalStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pending" => WithdrawalStatus::Pending,
            "Processing" => WithdrawalStatus::Processing,
            "Approved" => WithdrawalStatus::Approved,
            "Completed" => WithdrawalStatus::Completed,
            "Rejected" => WithdrawalStatus::Rejected,
            "Failed" => WithdrawalStatus::Failed,
            _ => WithdrawalStatus::Other(raw),
        }
    }
}

impl From<WithdrawalStatus> for String {
    fn from(status: WithdrawalStatus) -> Self {
        status.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalAction {
    /// Pending -> Approved, requires a transaction reference
    Approve,
    /// Pending -> Rejected, requires a reason
    Reject,
}

impl ModerationAction for WithdrawalAction {
    fn name(&self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "approve",
            WithdrawalAction::Reject => "reject",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "Withdrawal approved successfully",
            WithdrawalAction::Reject => "Withdrawal rejected successfully",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "Failed to approve withdrawal",
            WithdrawalAction::Reject => "Failed to reject withdrawal",
        }
    }
}

pub struct WithdrawalMachine;

impl StateMachine for WithdrawalMachine {
    const KIND: EntityKind = EntityKind::Withdrawal;
    type Status = WithdrawalStatus;
    type Action = WithdrawalAction;

    const ACTIONS: &'static [WithdrawalAction] =
        &[WithdrawalAction::Approve, WithdrawalAction::Reject];

    fn target(current: &WithdrawalStatus, action: WithdrawalAction) -> Option<WithdrawalStatus> {
        match (current, action) {
            (WithdrawalStatus::Pending, WithdrawalAction::Approve) => {
                Some(WithdrawalStatus::Approved)
            }
            (WithdrawalStatus::Pending, WithdrawalAction::Reject) => {
                Some(WithdrawalStatus::Rejected)
            }
            _ => None,
        }
    }
}

/// Body of an approve or reject decision on a withdrawal request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDecision {
    pub is_approved: bool,
    pub reason: String,
    pub admin_notes: String,
    pub transaction_id: String,
}

impl WithdrawalDecision {
    /// Approve form as first presented: reason pre-filled, no transaction yet.
    pub fn approval() -> Self {
        Self {
            is_approved: true,
            reason: "Approved".to_string(),
            ..Self::default()
        }
    }

    /// Empty reject form.
    pub fn rejection() -> Self {
        Self::default()
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_admin_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = notes.into();
        self
    }

    /// Local guard for `action`. Runs before any remote call; a view disables
    /// the submit button while this fails.
    pub fn check(&self, action: WithdrawalAction) -> ModerationResult<()> {
        match action {
            WithdrawalAction::Approve if self.transaction_id.trim().is_empty() => Err(
                ModerationError::Validation("transaction id is required to approve".to_string()),
            ),
            WithdrawalAction::Reject if self.reason.trim().is_empty() => Err(
                ModerationError::Validation("reason is required to reject".to_string()),
            ),
            _ => Ok(()),
        }
    }

    pub fn can_submit(&self, action: WithdrawalAction) -> bool {
        self.check(action).is_ok()
    }
}
