//! Audit record data structures
//!
//! An `AuditRecord` describes one business operation's effect on a client
//! or one of its accounts. Records are append-only: nothing in this crate
//! mutates or removes one after it is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::changes::{Auditable, ChangeSet};
use super::encoding::audit_encoding;
use crate::models::AuditId;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Create => write!(f, "CREATE"),
            OperationType::Read => write!(f, "READ"),
            OperationType::Update => write!(f, "UPDATE"),
            OperationType::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single, immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: AuditId,

    pub operation_type: OperationType,

    /// Owning client of the affected entity
    pub subject_id: String,

    /// Who performed the operation
    pub actor_id: String,

    /// Field name, identifier, or delimited list of changed fields
    pub field_name: String,

    /// Empty when not applicable
    pub before_value: String,

    /// Empty when not applicable
    pub after_value: String,

    /// Structured `{field: {before, after}}` when an update changed more than one field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_field_payload: Option<ChangeSet>,

    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    fn base(
        operation_type: OperationType,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditId::new(),
            operation_type,
            subject_id: subject_id.into(),
            actor_id: actor_id.into(),
            field_name: String::new(),
            before_value: String::new(),
            after_value: String::new(),
            multi_field_payload: None,
            timestamp: Utc::now(),
        }
    }

    /// Record for a create: empty before, full encoding after
    pub fn create<E: Auditable>(
        entity: &E,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        let mut record = Self::base(OperationType::Create, subject_id, actor_id);
        record.field_name = entity.audit_id();
        record.after_value = entity.encode();
        record
    }

    /// Record for a read: identical before and after snapshots
    pub fn read<E: Auditable>(
        entity: &E,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        let encoded = entity.encode();
        let mut record = Self::base(OperationType::Read, subject_id, actor_id);
        record.field_name = entity.audit_id();
        record.before_value = encoded.clone();
        record.after_value = encoded;
        record
    }

    /// Record for an update, consolidating every changed field
    ///
    /// The caller guarantees `changes` is not empty.
    pub fn update(
        changes: &ChangeSet,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        let encoded = audit_encoding(changes);
        let mut record = Self::base(OperationType::Update, subject_id, actor_id);
        record.field_name = encoded.field_names;
        record.before_value = encoded.before;
        record.after_value = encoded.after;
        if changes.len() > 1 {
            record.multi_field_payload = Some(changes.clone());
        }
        record
    }

    /// Record for a delete: a description of what was removed, empty after
    pub fn delete(
        entity_type_label: &str,
        entity_id: &str,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        let mut record = Self::base(OperationType::Delete, subject_id, actor_id);
        record.field_name = entity_id.to_string();
        record.before_value = format!("{} with ID: {}", entity_type_label, entity_id);
        record
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} subject={} actor={} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation_type,
            self.subject_id,
            self.actor_id,
            self.field_name
        );

        if self.operation_type == OperationType::Update {
            output.push_str(&format!(
                "\n  Before: {}\n  After:  {}",
                self.before_value, self.after_value
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;

    fn client() -> Client {
        Client::new("John", "Doe", "john@example.com")
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(OperationType::Create.to_string(), "CREATE");
        assert_eq!(OperationType::Read.to_string(), "READ");
        assert_eq!(OperationType::Update.to_string(), "UPDATE");
        assert_eq!(OperationType::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_create_record() {
        let client = client();
        let id = client.id.full();
        let record = AuditRecord::create(&client, id.clone(), "system");

        assert_eq!(record.operation_type, OperationType::Create);
        assert_eq!(record.before_value, "");
        assert!(record.after_value.contains(&id));
        assert!(record.after_value.contains("John"));
        assert!(record.multi_field_payload.is_none());
    }

    #[test]
    fn test_read_record_has_equal_sides() {
        let client = client();
        let record = AuditRecord::read(&client, client.id.full(), "teller-7");
        assert_eq!(record.before_value, record.after_value);
        assert_eq!(record.actor_id, "teller-7");
    }

    #[test]
    fn test_single_field_update_has_no_payload() {
        let mut changes = ChangeSet::new();
        changes.push("firstName", "John", "Bob");

        let record = AuditRecord::update(&changes, "c1", "system");
        assert_eq!(record.field_name, "firstName");
        assert_eq!(record.before_value, "firstName: John");
        assert_eq!(record.after_value, "firstName: Bob");
        assert!(record.multi_field_payload.is_none());
    }

    #[test]
    fn test_multi_field_update_carries_payload() {
        let mut changes = ChangeSet::new();
        changes.push("firstName", "John", "Bob");
        changes.push("phoneNumber", "1", "2");

        let record = AuditRecord::update(&changes, "c1", "system");
        assert_eq!(record.field_name, "firstName, phoneNumber");
        assert_eq!(record.multi_field_payload, Some(changes));
    }

    #[test]
    fn test_delete_record() {
        let record = AuditRecord::delete("Client", "c1", "c1", "system");
        assert_eq!(record.before_value, "Client with ID: c1");
        assert_eq!(record.after_value, "");
        assert_eq!(record.operation_type, OperationType::Delete);
    }

    #[test]
    fn test_serialization() {
        let mut changes = ChangeSet::new();
        changes.push("firstName", "John", "Bob");
        changes.push("lastName", "Doe", "Smith");
        let record = AuditRecord::update(&changes, "c1", "system");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"operationType\":\"UPDATE\""));
        assert!(json.contains("\"multiFieldPayload\""));

        let deserialized: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }

    #[test]
    fn test_human_readable_format() {
        let record = AuditRecord::delete("Account", "a1", "c1", "system");
        let formatted = record.format_human_readable();
        assert!(formatted.contains("DELETE"));
        assert!(formatted.contains("subject=c1"));
        assert!(formatted.contains("a1"));
    }
}
