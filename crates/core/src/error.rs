use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ModerationResult<T> = Result<T, ModerationError>;

/// Failure class reported by a remote collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    NotFound,
    Validation,
    Server,
    Network,
    Auth,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::NotFound => "not_found",
            ErrorClass::Validation => "validation",
            ErrorClass::Server => "server",
            ErrorClass::Network => "network",
            ErrorClass::Auth => "auth",
        }
    }
}

/// Structured failure returned by every remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} error: {message}", class.as_str())]
pub struct RemoteError {
    pub class: ErrorClass,
    pub message: String,
}

impl RemoteError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Server, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Auth, message)
    }
}

#[derive(Error, Debug)]
pub enum ModerationError {
    /// A local precondition failed; the remote call was never made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource already has an in-flight mutation.
    #[error("Action already in flight for {0}")]
    Conflict(String),

    #[error("No matching resource: {0}")]
    NotFound(String),

    /// Invalid or expired credential. Observers must tear the session down.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network or server-side failure. Retried only on explicit user request.
    #[error("Transient {class:?} error: {message}")]
    Transient { class: ErrorClass, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModerationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModerationError::Transient { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ModerationError::Auth(_))
    }
}

impl From<RemoteError> for ModerationError {
    fn from(err: RemoteError) -> Self {
        match err.class {
            ErrorClass::NotFound => ModerationError::NotFound(err.message),
            ErrorClass::Validation => ModerationError::Validation(err.message),
            ErrorClass::Auth => ModerationError::Auth(err.message),
            ErrorClass::Server | ErrorClass::Network => ModerationError::Transient {
                class: err.class,
                message: err.message,
            },
        }
    }
}

impl From<config::ConfigError> for ModerationError {
    fn from(err: config::ConfigError) -> Self {
        ModerationError::Config(err.to_string())
    }
}
