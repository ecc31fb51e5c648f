//! Audit recorder
//!
//! Builds one `AuditRecord` per operation and hands it to an `AuditStore`.
//! Every method is best-effort: preconditions that show the operation did
//! not really happen turn the call into a no-op, and storage failures are
//! logged here and never returned.

use std::sync::Arc;

use super::changes::{Auditable, ChangeSet};
use super::entry::{AuditRecord, OperationType};
use super::logger::AuditStore;
use crate::models::AuditId;

/// What a recorder call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A record was persisted
    Written(AuditId),
    /// Preconditions said there was nothing to record
    Skipped,
    /// The store rejected the record; the failure has been logged
    Failed,
}

impl RecordOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Writes audit records for create/read/update/delete operations
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record a creation. `None` means the create did not succeed.
    pub fn record_create<E: Auditable>(
        &self,
        entity: Option<&E>,
        subject_id: &str,
        actor_id: &str,
    ) -> RecordOutcome {
        let Some(entity) = entity else {
            tracing::debug!(entity = E::LABEL, "No created entity; skipping audit record");
            return RecordOutcome::Skipped;
        };
        self.write(AuditRecord::create(entity, subject_id, actor_id))
    }

    /// Record a read snapshot. `None` means nothing was read.
    pub fn record_read<E: Auditable>(
        &self,
        entity: Option<&E>,
        subject_id: &str,
        actor_id: &str,
    ) -> RecordOutcome {
        let Some(entity) = entity else {
            tracing::debug!(entity = E::LABEL, "No entity read; skipping audit record");
            return RecordOutcome::Skipped;
        };
        self.write(AuditRecord::read(entity, subject_id, actor_id))
    }

    /// Record an update as a single consolidated record
    ///
    /// An empty change set writes nothing.
    pub fn record_update<E: Auditable>(
        &self,
        old: &E,
        new: &E,
        subject_id: &str,
        changes: &ChangeSet,
        actor_id: &str,
    ) -> RecordOutcome {
        if changes.is_empty() {
            tracing::debug!(
                entity = E::LABEL,
                id = %new.audit_id(),
                "Update changed no audited fields; skipping audit record"
            );
            return RecordOutcome::Skipped;
        }
        if old.audit_id() != new.audit_id() {
            tracing::warn!(
                entity = E::LABEL,
                old_id = %old.audit_id(),
                new_id = %new.audit_id(),
                "Update snapshots carry different identifiers"
            );
        }
        self.write(AuditRecord::update(changes, subject_id, actor_id))
    }

    /// Record a deletion
    ///
    /// A missing entity or subject identifier means no deletion happened.
    pub fn record_delete(
        &self,
        entity_id: Option<&str>,
        subject_id: Option<&str>,
        entity_type_label: &str,
        actor_id: &str,
    ) -> RecordOutcome {
        let (Some(entity_id), Some(subject_id)) = (
            entity_id.filter(|id| !id.is_empty()),
            subject_id.filter(|id| !id.is_empty()),
        ) else {
            tracing::debug!(
                entity = entity_type_label,
                "Delete without entity or subject identifier; skipping audit record"
            );
            return RecordOutcome::Skipped;
        };
        self.write(AuditRecord::delete(
            entity_type_label,
            entity_id,
            subject_id,
            actor_id,
        ))
    }

    fn write(&self, record: AuditRecord) -> RecordOutcome {
        let operation: OperationType = record.operation_type;
        match self.store.append(&record) {
            Ok(()) => {
                tracing::debug!(
                    audit_id = %record.id,
                    operation = %operation,
                    subject = %record.subject_id,
                    "Audit record written"
                );
                RecordOutcome::Written(record.id)
            }
            Err(e) => {
                tracing::error!(
                    operation = %operation,
                    subject = %record.subject_id,
                    error = %e,
                    "Failed to persist audit record"
                );
                RecordOutcome::Failed
            }
        }
    }
}
