//! YAML export of the audit trail, for reading by people

use std::io::Write;

use crate::audit::AuditRecord;
use crate::error::{BankError, BankResult};
use crate::export::json::AuditExport;

/// Write audit records as YAML behind a comment header
pub fn export_audit_yaml<W: Write>(records: Vec<AuditRecord>, writer: &mut W) -> BankResult<()> {
    let export = AuditExport::new(records);

    let header = format!(
        "# bank-audit trail export\n# Generated: {}\n# Records: {}\n#\n# Records are append-only; edit a copy, never this file.\n\n",
        export.exported_at,
        export.records.len()
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| BankError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| BankError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a YAML export
pub fn import_audit_yaml(yaml_str: &str) -> BankResult<AuditExport> {
    let export: AuditExport =
        serde_yaml::from_str(yaml_str).map_err(|e| BankError::Export(e.to_string()))?;
    export.validate().map_err(BankError::Validation)?;
    Ok(export)
}
