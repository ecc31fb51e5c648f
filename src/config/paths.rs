//! Path management for bank-audit
//!
//! ## Path Resolution Order
//!
//! 1. `BANK_AUDIT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/bank-audit` or `~/.config/bank-audit`
//! 3. Windows: `%APPDATA%\bank-audit`

use std::path::PathBuf;

use crate::error::BankError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "BANK_AUDIT_DATA_DIR";

/// Manages all paths used by bank-audit
#[derive(Debug, Clone)]
pub struct BankPaths {
    base_dir: PathBuf,
}

impl BankPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BankError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create BankPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Entity data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Audit and outbox directory (`<base>/audit/`)
    pub fn audit_dir(&self) -> PathBuf {
        self.base_dir.join("audit")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Append-only audit trail (JSONL)
    pub fn audit_log(&self) -> PathBuf {
        self.audit_dir().join("audit.log")
    }

    /// Outbox file written by the outbox transport (JSONL)
    pub fn outbox_file(&self) -> PathBuf {
        self.audit_dir().join("outbox.log")
    }

    pub fn clients_file(&self) -> PathBuf {
        self.data_dir().join("clients.json")
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.data_dir().join("accounts.json")
    }

    /// Ensure base, data and audit directories exist
    pub fn ensure_directories(&self) -> Result<(), BankError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BankError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| BankError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.audit_dir())
            .map_err(|e| BankError::Io(format!("Failed to create audit directory: {}", e)))?;

        Ok(())
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, BankError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| BankError::Config("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("bank-audit"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, BankError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| BankError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("bank-audit"))
}
