//! CSV export of the audit trail
//!
//! One row per record, spreadsheet-friendly. The structured multi-field
//! payload is left out; its information is already in the flat columns.

use std::io::Write;

use crate::audit::AuditRecord;
use crate::error::{BankError, BankResult};

/// Column header of the CSV export
pub const CSV_HEADER: [&str; 8] = [
    "id",
    "timestamp",
    "operation",
    "subject_id",
    "actor_id",
    "field_name",
    "before",
    "after",
];

/// Write audit records as CSV
pub fn export_audit_csv<W: Write>(records: &[AuditRecord], writer: W) -> BankResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| BankError::Export(e.to_string()))?;

    for record in records {
        csv_writer
            .write_record([
                record.id.full(),
                record.timestamp.to_rfc3339(),
                record.operation_type.to_string(),
                record.subject_id.clone(),
                record.actor_id.clone(),
                record.field_name.clone(),
                record.before_value.clone(),
                record.after_value.clone(),
            ])
            .map_err(|e| BankError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| BankError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ChangeSet;
    use crate::models::Client;

    #[test]
    fn test_csv_export() {
        let client = Client::new("John", "Doe", "john@example.com");
        let mut changes = ChangeSet::new();
        changes.push("firstName", "John", "Bob");
        changes.push("phoneNumber", "555-0100", "555-0199");
        let records = vec![
            AuditRecord::create(&client, client.id.full(), "system"),
            AuditRecord::update(&changes, client.id.full(), "teller-7"),
        ];

        let mut output = Vec::new();
        export_audit_csv(&records, &mut output).unwrap();

        let mut reader = csv::Reader::from_reader(output.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "CREATE");
        assert_eq!(&rows[0][6], "");
        assert_eq!(&rows[1][2], "UPDATE");
        assert_eq!(&rows[1][4], "teller-7");
        // the comma-joined columns survive quoting
        assert_eq!(&rows[1][5], "firstName, phoneNumber");
        assert_eq!(&rows[1][7], "firstName: Bob, phoneNumber: 555-0199");
    }

    #[test]
    fn test_csv_export_empty() {
        let mut output = Vec::new();
        export_audit_csv(&[], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text.trim_end(),
            "id,timestamp,operation,subject_id,actor_id,field_name,before,after"
        );
    }
}
