//! Audit record persistence
//!
//! `AuditStore` is the write seam used by the recorder. `AuditLogger`
//! persists records to an append-only JSONL file, one record per line,
//! flushed immediately. `MemoryAuditStore` keeps them in memory.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use crate::error::{AuditError, AuditResult, BankError, BankResult};

use super::entry::AuditRecord;

/// Append-only sink for audit records
pub trait AuditStore: Send + Sync {
    /// Persist one record
    fn append(&self, record: &AuditRecord) -> AuditResult<()>;
}

/// Writes audit records to a JSONL file
pub struct AuditLogger {
    log_path: PathBuf,
    /// Serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Read all records, oldest first
    pub fn read_all(&self) -> BankResult<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| BankError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                BankError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                BankError::Json(format!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Read the most recent N records
    pub fn read_recent(&self, count: usize) -> BankResult<Vec<AuditRecord>> {
        let all_records = self.read_all()?;
        let start = all_records.len().saturating_sub(count);
        Ok(all_records[start..].to_vec())
    }

    /// Read every record about one client, oldest first
    pub fn read_for_subject(&self, subject_id: &str) -> BankResult<Vec<AuditRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.subject_id == subject_id)
            .collect())
    }

    /// Number of records in the log
    pub fn entry_count(&self) -> BankResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| BankError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let count = reader
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

impl AuditStore for AuditLogger {
    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuditError::StorageWrite(format!("Failed to serialize audit record: {}", e)))?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuditError::StorageWrite(format!("Failed to acquire audit log lock: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::StorageWrite(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| AuditError::StorageWrite(format!("Failed to write audit record: {}", e)))?;

        file.flush()
            .map_err(|e| AuditError::StorageWrite(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

/// Keeps audit records in memory
#[derive(Default)]
pub struct MemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored records, oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for MemoryAuditStore {
    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| AuditError::StorageWrite(format!("Failed to acquire write lock: {}", e)))?;
        records.push(record.clone());
        Ok(())
    }
}
