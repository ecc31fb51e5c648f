//! Audit trail export for compliance review
//!
//! - CSV: one row per record (spreadsheet-compatible)
//! - JSON: versioned document, machine-readable
//! - YAML: the same document with a comment header, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_audit_csv, CSV_HEADER};
pub use json::{export_audit_json, import_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_audit_yaml, import_audit_yaml};
