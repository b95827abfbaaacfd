use serde::{Deserialize, Serialize};
use std::fmt;

/// A moderated resource category. Each kind has its own status machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Campaign,
    Company,
    Marketer,
    Withdrawal,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaign",
            EntityKind::Company => "company",
            EntityKind::Marketer => "marketer",
            EntityKind::Withdrawal => "withdrawal",
        }
    }

    /// Plural noun used in user-facing list messages.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaigns",
            EntityKind::Company => "companies",
            EntityKind::Marketer => "marketers",
            EntityKind::Withdrawal => "withdrawal requests",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
