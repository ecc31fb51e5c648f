//! JSON export of the audit trail
//!
//! The export document carries a schema version so a reviewer's tooling can
//! reject files it does not understand.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditLogger, AuditRecord};
use crate::error::{BankError, BankResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Audit trail export document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Records in the order they were written
    pub records: Vec<AuditRecord>,
}

impl AuditExport {
    pub fn new(records: Vec<AuditRecord>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            records,
        }
    }

    /// Export everything in an audit log
    pub fn from_logger(logger: &AuditLogger) -> BankResult<Self> {
        Ok(Self::new(logger.read_all()?))
    }

    /// Check the schema version and that no record appears twice
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(record.id) {
                return Err(format!("Duplicate audit record {}", record.id));
            }
        }

        Ok(())
    }
}

/// Write audit records as a pretty-printed JSON document
pub fn export_audit_json<W: Write>(records: Vec<AuditRecord>, writer: &mut W) -> BankResult<()> {
    let export = AuditExport::new(records);
    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| BankError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| BankError::Export(e.to_string()))?;
    Ok(())
}

/// Parse and validate a JSON export
pub fn import_audit_json(json_str: &str) -> BankResult<AuditExport> {
    let export: AuditExport = serde_json::from_str(json_str)?;
    export.validate().map_err(BankError::Validation)?;
    Ok(export)
}
