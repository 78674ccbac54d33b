//! Error types for the bridge

use std::fmt;

use storebridge_hal::HalError;

/// Storage call that failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageOp {
    Read,
    Write,
    Remove,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOp::Read => write!(f, "read"),
            StorageOp::Write => write!(f, "write"),
            StorageOp::Remove => write!(f, "remove"),
        }
    }
}

/// Errors raised by the bridge
///
/// Nothing is retried or masked: every variant reaches the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeError {
    /// Configuration is unusable
    InvalidConfig(String),

    /// Stored text is not valid JSON (startup, `MalformedStatePolicy::Fail`)
    MalformedState {
        /// Slot that held the text
        key: String,
        /// Parser message
        reason: String,
    },

    /// Storage read, write or remove failed
    Storage {
        /// Failed call
        op: StorageOp,
        /// Slot involved
        key: String,
        /// Platform error
        error: HalError,
    },

    /// Confirmation task could not be posted
    Schedule(HalError),

    /// Value could not be serialized to JSON text
    Serialize(String),

    /// Application port missing or not callable
    Port(String),
}

impl BridgeError {
    /// Create a storage error for `op` on `key`
    pub fn storage(op: StorageOp, key: &str, error: HalError) -> Self {
        Self::Storage {
            op,
            key: key.to_string(),
            error,
        }
    }

    /// Check if this is a storage quota failure
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            BridgeError::Storage {
                error: HalError::QuotaExceeded,
                ..
            }
        )
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            BridgeError::MalformedState { key, reason } => {
                write!(f, "Malformed state in '{}': {}", key, reason)
            }
            BridgeError::Storage { op, key, error } => {
                write!(f, "Storage {} of '{}' failed: {}", op, key, error)
            }
            BridgeError::Schedule(e) => write!(f, "Scheduling error: {}", e),
            BridgeError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            BridgeError::Port(msg) => write!(f, "Port error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Serialize(e.to_string())
    }
}
