//! String encodings of a change set
//!
//! Audit records and change events flatten a [`ChangeSet`] differently and
//! downstream consumers read both formats, so they are kept as two separate
//! named encodings:
//!
//! - audit: values prefixed with their field name, `"firstName: John, phoneNumber: 555"`
//! - event: bare values joined with a comma, `"John,555"`

use super::changes::ChangeSet;
use crate::error::{AuditError, AuditResult};

/// Delimiter between entries in the audit encoding
pub const AUDIT_DELIMITER: &str = ", ";

/// Delimiter between entries in the event encoding
pub const EVENT_DELIMITER: &str = ",";

/// A change set flattened into three parallel strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedChanges {
    pub field_names: String,
    pub before: String,
    pub after: String,
}

/// Audit-record encoding: every value is prefixed by its field name
pub fn audit_encoding(changes: &ChangeSet) -> EncodedChanges {
    let mut names = Vec::with_capacity(changes.len());
    let mut before = Vec::with_capacity(changes.len());
    let mut after = Vec::with_capacity(changes.len());

    for change in changes {
        names.push(change.field.clone());
        before.push(format!("{}: {}", change.field, change.before));
        after.push(format!("{}: {}", change.field, change.after));
    }

    EncodedChanges {
        field_names: names.join(AUDIT_DELIMITER),
        before: before.join(AUDIT_DELIMITER),
        after: after.join(AUDIT_DELIMITER),
    }
}

/// Change-event encoding: names and values joined bare
pub fn event_encoding(changes: &ChangeSet) -> EncodedChanges {
    let names: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
    let before: Vec<&str> = changes.iter().map(|c| c.before.as_str()).collect();
    let after: Vec<&str> = changes.iter().map(|c| c.after.as_str()).collect();

    EncodedChanges {
        field_names: names.join(EVENT_DELIMITER),
        before: before.join(EVENT_DELIMITER),
        after: after.join(EVENT_DELIMITER),
    }
}

/// Encode a change set as the structured multi-field payload (JSON text)
pub fn encode_payload(changes: &ChangeSet) -> AuditResult<String> {
    serde_json::to_string(changes)
        .map_err(|e| AuditError::StorageWrite(format!("Failed to encode change payload: {}", e)))
}

/// Decode a structured multi-field payload back into a change set
pub fn decode_payload(payload: &str) -> AuditResult<ChangeSet> {
    serde_json::from_str(payload)
        .map_err(|e| AuditError::StorageWrite(format!("Failed to decode change payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_changes() -> ChangeSet {
        let mut set = ChangeSet::new();
        set.push("firstName", "John", "Bob");
        set.push("phoneNumber", "555-0100", "555-0199");
        set
    }

    #[test]
    fn test_audit_encoding_prefixes_values() {
        let encoded = audit_encoding(&two_changes());
        assert_eq!(encoded.field_names, "firstName, phoneNumber");
        assert_eq!(encoded.before, "firstName: John, phoneNumber: 555-0100");
        assert_eq!(encoded.after, "firstName: Bob, phoneNumber: 555-0199");
    }

    #[test]
    fn test_event_encoding_is_bare() {
        let encoded = event_encoding(&two_changes());
        assert_eq!(encoded.field_names, "firstName,phoneNumber");
        assert_eq!(encoded.before, "John,555-0100");
        assert_eq!(encoded.after, "Bob,555-0199");
    }

    #[test]
    fn test_single_change() {
        let mut set = ChangeSet::new();
        set.push("email", "", "a@b.io");

        let audit = audit_encoding(&set);
        assert_eq!(audit.field_names, "email");
        assert_eq!(audit.before, "email: ");

        let event = event_encoding(&set);
        assert_eq!(event.before, "");
        assert_eq!(event.after, "a@b.io");
    }

    #[test]
    fn test_payload_round_trip() {
        let set = two_changes();
        let payload = encode_payload(&set).unwrap();
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_payload("[1, 2]").is_err());
    }
}
