//! Campaign review: Pending, Active, Rejected.
//!
//! The remote side may still report `Approved` for campaigns approved before
//! `Active` was introduced; it is treated as a live campaign.

use serde::{Deserialize, Serialize};

use moderation_core::EntityKind;

use super::{ModerationAction, StateMachine, StatusLabel};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    Pending,
    Active,
    /// Legacy spelling of `Active`.
    Approved,
    Rejected,
    Other(String),
}

impl CampaignStatus {
    /// Whether the campaign is currently live.
    pub fn is_live(&self) -> bool {
        matches!(self, CampaignStatus::Active | CampaignStatus::Approved)
    }
}

impl StatusLabel for CampaignStatus {
    fn label(&self) -> &str {
        match self {
            CampaignStatus::Pending => "Pending",
            CampaignStatus::Active => "Active",
            CampaignStatus::Approved => "Approved",
            CampaignStatus::Rejected => "Rejected",
            CampaignStatus::Other(raw) => raw,
        }
    }

    fn is_recognized(&self) -> bool {
        !matches!(self, CampaignStatus::Other(_))
    }
}

impl From<String> for CampaignStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pending" => CampaignStatus::Pending,
            "Active" => CampaignStatus::Active,
            "Approved" => CampaignStatus::Approved,
            "Rejected" => CampaignStatus::Rejected,
            _ => CampaignStatus::Other(raw),
        }
    }
}

impl From<CampaignStatus> for String {
    fn from(status: CampaignStatus) -> Self {
        status.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignAction {
    /// Pending | Rejected -> Active
    Approve,
    /// Pending | Active | Approved -> Rejected
    Reject,
}

impl ModerationAction for CampaignAction {
    fn name(&self) -> &'static str {
        match self {
            CampaignAction::Approve => "approve",
            CampaignAction::Reject => "reject",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            CampaignAction::Approve => "Campaign approved successfully",
            CampaignAction::Reject => "Campaign rejected successfully",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            CampaignAction::Approve => "Failed to approve campaign",
            CampaignAction::Reject => "Failed to reject campaign",
        }
    }
}

pub struct CampaignMachine;

impl StateMachine for CampaignMachine {
    const KIND: EntityKind = EntityKind::Campaign;
    type Status = CampaignStatus;
    type Action = CampaignAction;

    const ACTIONS: &'static [CampaignAction] = &[CampaignAction::Approve, CampaignAction::Reject];

    fn target(current: &CampaignStatus, action: CampaignAction) -> Option<CampaignStatus> {
        match (current, action) {
            (CampaignStatus::Pending, CampaignAction::Approve)
            | (CampaignStatus::Rejected, CampaignAction::Approve) => Some(CampaignStatus::Active),
            (CampaignStatus::Pending, CampaignAction::Reject)
            | (CampaignStatus::Active, CampaignAction::Reject)
            | (CampaignStatus::Approved, CampaignAction::Reject) => Some(CampaignStatus::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_and_reject_cycle() {
        let active =
            CampaignMachine::validate_transition(&CampaignStatus::Pending, CampaignAction::Approve)
                .unwrap();
        assert_eq!(active, CampaignStatus::Active);

        let rejected =
            CampaignMachine::validate_transition(&active, CampaignAction::Reject).unwrap();
        assert_eq!(rejected, CampaignStatus::Rejected);

        // Rejected campaigns can be approved again.
        let again =
            CampaignMachine::validate_transition(&rejected, CampaignAction::Approve).unwrap();
        assert_eq!(again, CampaignStatus::Active);
    }

    #[test]
    fn test_invalid_transitions() {
        let result =
            CampaignMachine::validate_transition(&CampaignStatus::Active, CampaignAction::Approve);
        assert!(result.unwrap_err().to_string().contains("Invalid transition"));

        assert!(
            CampaignMachine::target(&CampaignStatus::Rejected, CampaignAction::Reject).is_none()
        );
    }

    #[test]
    fn test_legacy_approved_can_only_be_rejected() {
        assert!(CampaignStatus::Approved.is_live());
        assert_eq!(
            CampaignMachine::available_actions(&CampaignStatus::Approved),
            vec![CampaignAction::Reject]
        );
        assert_eq!(
            CampaignMachine::available_actions(&CampaignStatus::Pending),
            vec![CampaignAction::Approve, CampaignAction::Reject]
        );
    }

    #[test]
    fn test_unknown_status_is_labelled_not_rejected() {
        let status: CampaignStatus = serde_json::from_str("\"Archived\"").unwrap();
        assert_eq!(status, CampaignStatus::Other("Archived".to_string()));
        assert_eq!(status.label(), "Archived");
        assert!(!status.is_recognized());
        assert!(CampaignMachine::available_actions(&status).is_empty());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Archived\"");
    }
}
