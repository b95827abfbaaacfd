//! Moderation workflow controller for the affiliate admin console.
//!
//! Campaigns, companies, marketers and withdrawal requests each get a board
//! that keeps a filtered snapshot in sync with the remote system of record
//! and runs moderation actions through a per-id lock. Session identity is
//! resolved from the stored bearer credential; an auth failure anywhere
//! tears the session down.

pub mod boards;
pub mod client;
pub mod dispatcher;
pub mod filter;
pub mod machines;
pub mod models;
pub mod notify;
pub mod session;
pub mod sync;

pub use boards::{
    BoardContext, CampaignBoard, CompanyBoard, MarketerBoard, RefreshPolicy, WithdrawalBoard,
};
pub use client::{
    CampaignClient, CompanyClient, CompanyScope, ListSource, MarketerClient, WithdrawalClient,
};
pub use dispatcher::{ActionDispatcher, LockSet};
pub use filter::{FilterPatch, FilterSpec, FilterValue};
pub use models::{Campaign, Company, Entity, Marketer, WithdrawalRequest};
pub use notify::{NavigationSink, NoticeKind, NotificationSink, TracingNotifier};
pub use session::{AuthClient, CredentialStore, SessionContext, SessionIdentity};
pub use sync::{ListCondition, ListSynchronizer};
