//! Audit trail for client and account operations
//!
//! Every successful create, read, update and delete produces exactly one
//! append-only `AuditRecord`.
//!
//! # Architecture
//!
//! - `changes`: the `Auditable` trait with each entity's declared field list,
//!   and `diff` which turns two snapshots into an ordered `ChangeSet`.
//! - `encoding`: the two flat string encodings of a change set (prefixed for
//!   audit records, bare for change events) and the structured payload.
//! - `entry`: `AuditRecord` and its constructors, one per operation type.
//! - `logger`: the `AuditStore` seam, the JSONL `AuditLogger`, and an
//!   in-memory store.
//! - `recorder`: `AuditRecorder`, which applies the no-op rules and absorbs
//!   storage failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use bank_audit::audit::{diff, AuditLogger, AuditRecorder};
//!
//! let recorder = AuditRecorder::new(Arc::new(AuditLogger::new(paths.audit_log())));
//! let changes = diff(Some(&before), Some(&after))?;
//! recorder.record_update(&before, &after, &before.id.full(), &changes, "teller-7");
//! ```

mod changes;
mod encoding;
mod entry;
mod logger;
mod recorder;

pub use changes::{diff, diff_snapshots, Auditable, ChangeSet, FieldChange, FieldSpec, Snapshot};
pub use encoding::{
    audit_encoding, decode_payload, encode_payload, event_encoding, EncodedChanges,
    AUDIT_DELIMITER, EVENT_DELIMITER,
};
pub use entry::{AuditRecord, OperationType};
pub use logger::{AuditLogger, AuditStore, MemoryAuditStore};
pub use recorder::{AuditRecorder, RecordOutcome};
