//! Storage layer for bank-audit
//!
//! Entities live in memory behind `RwLock`s and are written through to JSON
//! files atomically on every change.

pub mod accounts;
pub mod clients;
pub mod file_io;

pub use accounts::AccountRepository;
pub use clients::ClientRepository;
pub use file_io::{read_json, write_json_atomic};

use crate::config::paths::BankPaths;
use crate::error::BankError;

/// Keyed entity store
pub trait EntityStore<E>: Send + Sync {
    type Id: Copy;

    fn get(&self, id: Self::Id) -> Result<Option<E>, BankError>;

    fn exists(&self, id: Self::Id) -> Result<bool, BankError>;

    /// Insert or replace, returning the stored entity
    fn save(&self, entity: E) -> Result<E, BankError>;

    /// Remove; `false` when nothing was stored under `id`
    fn delete(&self, id: Self::Id) -> Result<bool, BankError>;
}

/// Storage coordinator that provides access to all repositories
pub struct Storage {
    paths: BankPaths,
    pub clients: ClientRepository,
    pub accounts: AccountRepository,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: BankPaths) -> Result<Self, BankError> {
        paths.ensure_directories()?;

        Ok(Self {
            clients: ClientRepository::new(paths.clients_file()),
            accounts: AccountRepository::new(paths.accounts_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &BankPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), BankError> {
        self.clients.load()?;
        self.accounts.load()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BankPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("audit").exists());
        assert_eq!(storage.clients.count().unwrap(), 0);
    }
}
