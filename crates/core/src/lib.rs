pub mod config;
pub mod error;
pub mod types;

pub use config::ModerationConfig;
pub use error::{ErrorClass, ModerationError, ModerationResult, RemoteError};
pub use types::EntityKind;
