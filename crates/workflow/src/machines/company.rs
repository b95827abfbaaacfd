//! Company verification: Pending, Verified, Suspended, Rejected.
//!
//! `Approve` and `Verify` are kept as separate transitions. Approve answers a
//! pending registration; Verify grants the verified badge from any
//! non-verified status. The server decides the final status of both, which is
//! why company boards always refetch after a successful action.
//!
//! Most company endpoints report only the `isVerified` flag. An unverified
//! company without an explicit status may be pending, suspended or rejected,
//! so it is read as `Unverified` and every action that can apply to one of
//! those three is offered; the server rejects the ones that do not fit.

use serde::{Deserialize, Serialize};

use moderation_core::EntityKind;

use super::{ModerationAction, StateMachine, StatusLabel};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompanyStatus {
    Pending,
    Verified,
    Suspended,
    Rejected,
    /// Flag-only payload with `isVerified == false`.
    Unverified,
    Other(String),
}

impl CompanyStatus {
    /// Status implied by the verification flag alone, for payloads that carry
    /// no explicit status.
    pub fn from_verified(is_verified: bool) -> Self {
        if is_verified {
            CompanyStatus::Verified
        } else {
            CompanyStatus::Unverified
        }
    }
}

impl StatusLabel for CompanyStatus {
    fn label(&self) -> &str {
        match self {
            CompanyStatus::Pending => "Pending",
            CompanyStatus::Verified => "Verified",
            CompanyStatus::Suspended => "Suspended",
            CompanyStatus::Rejected => "Rejected",
            CompanyStatus::Unverified => "Unverified",
            CompanyStatus::Other(raw) => raw,
        }
    }

    fn is_recognized(&self) -> bool {
        !matches!(self, CompanyStatus::Other(_))
    }
}

impl From<String> for CompanyStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pending" => CompanyStatus::Pending,
            "Verified" => CompanyStatus::Verified,
            "Suspended" => CompanyStatus::Suspended,
            "Rejected" => CompanyStatus::Rejected,
            "Unverified" => CompanyStatus::Unverified,
            _ => CompanyStatus::Other(raw),
        }
    }
}

impl From<CompanyStatus> for String {
    fn from(status: CompanyStatus) -> Self {
        status.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyAction {
    /// Pending -> Verified (server decides eligibility)
    Approve,
    /// Pending | Suspended | Rejected -> Verified
    Verify,
    /// Verified -> Suspended
    Suspend,
    /// Suspended -> Verified
    Reactivate,
    /// Pending -> Rejected
    Reject,
}

impl ModerationAction for CompanyAction {
    fn name(&self) -> &'static str {
        match self {
            CompanyAction::Approve => "approve",
            CompanyAction::Verify => "verify",
            CompanyAction::Suspend => "suspend",
            CompanyAction::Reactivate => "reactivate",
            CompanyAction::Reject => "reject",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            CompanyAction::Approve => "Company approved",
            CompanyAction::Verify => "Company verified",
            CompanyAction::Suspend => "Company suspended",
            CompanyAction::Reactivate => "Company reactivated",
            CompanyAction::Reject => "Company rejected",
        }
    }

    fn failure_message(&self) -> &'static str {
        "Action failed"
    }
}

pub struct CompanyMachine;

impl StateMachine for CompanyMachine {
    const KIND: EntityKind = EntityKind::Company;
    type Status = CompanyStatus;
    type Action = CompanyAction;

    const ACTIONS: &'static [CompanyAction] = &[
        CompanyAction::Approve,
        CompanyAction::Reject,
        CompanyAction::Verify,
        CompanyAction::Suspend,
        CompanyAction::Reactivate,
    ];

    fn target(current: &CompanyStatus, action: CompanyAction) -> Option<CompanyStatus> {
        match (current, action) {
            (CompanyStatus::Pending, CompanyAction::Approve) => Some(CompanyStatus::Verified),
            (CompanyStatus::Pending, CompanyAction::Reject) => Some(CompanyStatus::Rejected),
            (CompanyStatus::Pending, CompanyAction::Verify)
            | (CompanyStatus::Suspended, CompanyAction::Verify)
            | (CompanyStatus::Rejected, CompanyAction::Verify) => Some(CompanyStatus::Verified),
            (CompanyStatus::Verified, CompanyAction::Suspend) => Some(CompanyStatus::Suspended),
            (CompanyStatus::Suspended, CompanyAction::Reactivate) => Some(CompanyStatus::Verified),
            (CompanyStatus::Unverified, CompanyAction::Reject) => Some(CompanyStatus::Rejected),
            (CompanyStatus::Unverified, CompanyAction::Suspend) => Some(CompanyStatus::Suspended),
            (CompanyStatus::Unverified, _) => Some(CompanyStatus::Verified),
            _ => None,
        }
    }
}
