//! Marketer verification: a two-state toggle derived from the `isVerified` flag.

use serde::{Deserialize, Serialize};

use moderation_core::EntityKind;

use super::{ModerationAction, StateMachine, StatusLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketerStatus {
    Unverified,
    Verified,
}

impl MarketerStatus {
    pub fn from_verified(is_verified: bool) -> Self {
        if is_verified {
            MarketerStatus::Verified
        } else {
            MarketerStatus::Unverified
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, MarketerStatus::Verified)
    }
}

impl StatusLabel for MarketerStatus {
    fn label(&self) -> &str {
        match self {
            MarketerStatus::Unverified => "Unverified",
            MarketerStatus::Verified => "Verified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketerAction {
    Verify,
    Unverify,
}

impl ModerationAction for MarketerAction {
    fn name(&self) -> &'static str {
        match self {
            MarketerAction::Verify => "verify",
            MarketerAction::Unverify => "unverify",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            MarketerAction::Verify => "Marketer verified",
            MarketerAction::Unverify => "Marketer unverified",
        }
    }

    fn failure_message(&self) -> &'static str {
        "Action failed"
    }
}

pub struct MarketerMachine;

impl StateMachine for MarketerMachine {
    const KIND: EntityKind = EntityKind::Marketer;
    type Status = MarketerStatus;
    type Action = MarketerAction;

    const ACTIONS: &'static [MarketerAction] = &[MarketerAction::Verify, MarketerAction::Unverify];

    fn target(current: &MarketerStatus, action: MarketerAction) -> Option<MarketerStatus> {
        match (current, action) {
            (MarketerStatus::Unverified, MarketerAction::Verify) => Some(MarketerStatus::Verified),
            (MarketerStatus::Verified, MarketerAction::Unverify) => {
                Some(MarketerStatus::Unverified)
            }
            _ => None,
        }
    }
}
