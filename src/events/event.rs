//! Change event wire format

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};

/// Operation kinds carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventOperation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for EventOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventOperation::Create => write!(f, "CREATE"),
            EventOperation::Update => write!(f, "UPDATE"),
            EventOperation::Delete => write!(f, "DELETE"),
        }
    }
}

/// One change event, built and discarded per publish call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub actor_id: String,
    pub subject_id: String,
    /// Best effort; empty when unknown
    pub subject_email: String,
    pub operation_type: EventOperation,
    /// Comma-joined attribute names
    pub attribute_names: String,
    /// Comma-joined values before the operation
    pub before_value: String,
    /// Comma-joined values after the operation
    pub after_value: String,
}

impl ChangeEvent {
    /// Serialize to the JSON payload handed to the transport for `topic`
    pub fn to_payload(&self, topic: &str) -> AuditResult<String> {
        serde_json::to_string(self).map_err(|e| {
            AuditError::transport(topic, format!("Failed to serialize change event: {}", e))
        })
    }
}
