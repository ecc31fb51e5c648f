//! Custom error types for bank-audit
//!
//! Two hierarchies live here. `BankError` covers the business services and
//! the storage layer; it is what callers of the audited services see.
//! `AuditError` covers the audit/event side effects and never crosses the
//! interception boundary.

use thiserror::Error;

/// The main error type for business and storage operations
#[derive(Error, Debug)]
pub enum BankError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Operation conflicts with the current entity state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl BankError {
    /// Create a "not found" error for clients
    pub fn client_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Client",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for BankError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BankError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for business operations
pub type BankResult<T> = Result<T, BankError>;

/// Failures inside the audit/event pipeline
///
/// Every variant is absorbed and logged at the component that raised it.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Diff requested on absent or mismatched entities
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    /// Audit record could not be persisted
    #[error("Failed to write audit record: {0}")]
    StorageWrite(String),

    /// Change event could not be handed off or delivered
    #[error("Failed to publish to topic '{topic}': {reason}")]
    Transport { topic: String, reason: String },
}

impl AuditError {
    /// Create a transport error for a topic
    pub fn transport(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type AuditResult<T> = Result<T, AuditError>;
