//! Per-kind moderation status machines.
//!
//! All four machines are cyclic: no status is terminal, and a status string
//! the remote side introduces later is carried as an `Other` variant that
//! renders under its raw label but accepts no transitions.

pub mod campaign;
pub mod company;
pub mod marketer;
pub mod withdrawal;

use std::fmt;

use moderation_core::{EntityKind, ModerationError, ModerationResult};

pub use campaign::{CampaignAction, CampaignMachine, CampaignStatus};
pub use company::{CompanyAction, CompanyMachine, CompanyStatus};
pub use marketer::{MarketerAction, MarketerMachine, MarketerStatus};
pub use withdrawal::{WithdrawalAction, WithdrawalDecision, WithdrawalMachine, WithdrawalStatus};

/// Display label of a status.
pub trait StatusLabel {
    fn label(&self) -> &str;

    /// False for statuses this build does not know about.
    fn is_recognized(&self) -> bool {
        true
    }
}

/// A mutating moderation action and its user-facing notification texts.
pub trait ModerationAction: Copy + fmt::Debug + PartialEq + 'static {
    fn name(&self) -> &'static str;
    fn success_message(&self) -> &'static str;
    fn failure_message(&self) -> &'static str;
}

/// Legal transitions for one entity kind.
pub trait StateMachine {
    const KIND: EntityKind;
    type Status: StatusLabel + Clone + PartialEq + fmt::Debug;
    type Action: ModerationAction;

    /// Every action of this kind, in display order.
    const ACTIONS: &'static [Self::Action];

    /// Target status of `action` from `current`, or `None` when not allowed.
    fn target(current: &Self::Status, action: Self::Action) -> Option<Self::Status>;

    /// Validate that `action` is allowed from `current` and return the target status.
    fn validate_transition(
        current: &Self::Status,
        action: Self::Action,
    ) -> ModerationResult<Self::Status> {
        Self::target(current, action).ok_or_else(|| {
            ModerationError::Validation(format!(
                "Invalid transition: cannot {} a {} in status {}",
                action.name(),
                Self::KIND,
                current.label()
            ))
        })
    }

    /// Actions a view may offer for an entity in `current`.
    fn available_actions(current: &Self::Status) -> Vec<Self::Action> {
        Self::ACTIONS
            .iter()
            .copied()
            .filter(|action| Self::target(current, *action).is_some())
            .collect()
    }
}
