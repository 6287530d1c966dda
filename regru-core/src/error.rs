//! Error types for the regru CLI

use serde_json::Value;
use thiserror::Error;

/// Exit code for runtime, API, network, and configuration failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for usage, validation, authentication, and policy failures.
pub const EXIT_USAGE: i32 = 2;

/// Core error type for regru operations
#[derive(Error, Debug)]
pub enum RegruError {
    /// Bad arguments, disallowed config keys, malformed assignments
    #[error("{0}")]
    Usage(String),

    /// Invalid persisted config or an unusable effective config
    #[error("{0}")]
    Config(String),

    /// Credentials required but not configured
    #[error("{0}")]
    Auth(String),

    /// Method rejected by client-side policy
    #[error("{0}")]
    Policy(String),

    /// Every attempt ran into the per-attempt timeout
    #[error("Request timed out after {timeout_ms}ms.")]
    Timeout { timeout_ms: u64 },

    /// Connection failure, non-JSON body, or non-2xx status
    #[error("{message}")]
    Transport {
        message: String,
        details: Option<Value>,
    },

    /// Well-formed response whose `result` is not `success`
    #[error("{code}: {text}")]
    Api {
        code: String,
        text: String,
        body: Value,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for regru operations
pub type Result<T> = std::result::Result<T, RegruError>;

impl RegruError {
    /// Process exit code associated with this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RegruError::Usage(_) | RegruError::Auth(_) | RegruError::Policy(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Structured detail attached to the failure, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            RegruError::Transport { details, .. } => details.as_ref(),
            RegruError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        RegruError::Usage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        RegruError::Config(message.into())
    }

    pub fn transport(message: impl Into<String>, details: Option<Value>) -> Self {
        RegruError::Transport {
            message: message.into(),
            details,
        }
    }
}

impl From<serde_json::Error> for RegruError {
    fn from(err: serde_json::Error) -> Self {
        RegruError::Serialization(err.to_string())
    }
}
