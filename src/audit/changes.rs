//! Field-level diffing between two snapshots of the same entity
//!
//! Each auditable entity declares an ordered list of `(name, accessor)`
//! pairs. Diffing walks that list in order, so the output is deterministic
//! and never includes fields the entity chose not to declare (its primary
//! key and nested collections).

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AuditError, AuditResult};
use crate::models::{Account, Client};

/// A declared, diffable field of entity `E`
pub struct FieldSpec<E> {
    /// Field name as it appears in audit records and events
    pub name: &'static str,
    /// Reads the field as human-readable text; `None` stands for null
    pub read: fn(&E) -> Option<String>,
}

impl<E> FieldSpec<E> {
    pub const fn new(name: &'static str, read: fn(&E) -> Option<String>) -> Self {
        Self { name, read }
    }

    /// The field value with null rendered as the empty string
    pub fn value_of(&self, entity: &E) -> String {
        (self.read)(entity).unwrap_or_default()
    }
}

/// An entity whose operations can be audited and published
pub trait Auditable: Serialize + Sized + 'static {
    /// Human label used in delete records ("Client with ID: ...")
    const LABEL: &'static str;

    /// Declared diffable fields, in output order
    fn audit_fields() -> &'static [FieldSpec<Self>];

    /// Identifier of this entity (full UUID text)
    fn audit_id(&self) -> String;

    /// Identifier of the owning client
    fn subject_id(&self) -> String;

    /// Full string encoding of the entity (a JSON object)
    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One changed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(skip)]
    pub field: String,
    pub before: String,
    pub after: String,
}

/// Ordered mapping of changed field name to its `(before, after)` pair
///
/// Serializes as a JSON object `{field: {before, after}}` whose key order
/// is the diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change, replacing any earlier entry for the same field
    pub fn push(
        &mut self,
        field: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) {
        let field = field.into();
        self.changes.retain(|c| c.field != field);
        self.changes.push(FieldChange {
            field,
            before: before.into(),
            after: after.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    /// Changed field names in diff order
    pub fn field_names(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.field.as_str()).collect()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len()))?;
        for change in &self.changes {
            map.serialize_entry(&change.field, change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChangeSetVisitor;

        impl<'de> Visitor<'de> for ChangeSetVisitor {
            type Value = ChangeSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field name to {before, after}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ChangeSet, A::Error> {
                let mut set = ChangeSet::new();
                while let Some((field, change)) = access.next_entry::<String, FieldChange>()? {
                    set.push(field, change.before, change.after);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ChangeSetVisitor)
    }
}

/// Compare two snapshots of the same entity type field by field
///
/// # Errors
///
/// Returns `AuditError::InvalidComparison` when either snapshot is absent.
pub fn diff<E: Auditable>(old: Option<&E>, new: Option<&E>) -> AuditResult<ChangeSet> {
    let (old, new) = match (old, new) {
        (Some(old), Some(new)) => (old, new),
        (None, _) => {
            return Err(AuditError::InvalidComparison(format!(
                "{} snapshot before the operation is absent",
                E::LABEL
            )))
        }
        (_, None) => {
            return Err(AuditError::InvalidComparison(format!(
                "{} snapshot after the operation is absent",
                E::LABEL
            )))
        }
    };

    let mut changes = ChangeSet::new();
    for field in E::audit_fields() {
        let before = (field.read)(old);
        let after = (field.read)(new);
        // Both null is no change; null vs value always is
        if before != after {
            changes.push(
                field.name,
                before.unwrap_or_default(),
                after.unwrap_or_default(),
            );
        }
    }

    Ok(changes)
}

/// A snapshot of any auditable entity, for callers holding mixed types
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Client(Client),
    Account(Account),
}

impl Snapshot {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Client(_) => Client::LABEL,
            Self::Account(_) => Account::LABEL,
        }
    }

    pub fn audit_id(&self) -> String {
        match self {
            Self::Client(c) => c.audit_id(),
            Self::Account(a) => a.audit_id(),
        }
    }
}

impl From<Client> for Snapshot {
    fn from(client: Client) -> Self {
        Self::Client(client)
    }
}

impl From<Account> for Snapshot {
    fn from(account: Account) -> Self {
        Self::Account(account)
    }
}

/// Diff two snapshots whose entity types are only known at runtime
///
/// # Errors
///
/// Returns `AuditError::InvalidComparison` when either snapshot is absent
/// or the two hold different entity types.
pub fn diff_snapshots(old: Option<&Snapshot>, new: Option<&Snapshot>) -> AuditResult<ChangeSet> {
    match (old, new) {
        (Some(Snapshot::Client(a)), Some(Snapshot::Client(b))) => diff(Some(a), Some(b)),
        (Some(Snapshot::Account(a)), Some(Snapshot::Account(b))) => diff(Some(a), Some(b)),
        (Some(a), Some(b)) => Err(AuditError::InvalidComparison(format!(
            "cannot compare {} with {}",
            a.label(),
            b.label()
        ))),
        _ => Err(AuditError::InvalidComparison(
            "both snapshots are required".into(),
        )),
    }
}
