//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::BankError;
use crate::models::{Account, AccountId, ClientId};

use super::file_io::{read_json, write_json_atomic};
use super::EntityStore;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

/// Repository for account persistence
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> Result<(), BankError> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| BankError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for account in file_data.accounts {
            data.insert(account.id, account);
        }

        Ok(())
    }

    /// Write the given map to disk; callers hold the write lock
    fn write_out(&self, data: &HashMap<AccountId, Account>) -> Result<(), BankError> {
        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        write_json_atomic(&self.path, &AccountData { accounts })
    }

    /// All accounts owned by a client, ordered by opening date
    pub fn get_by_client(&self, client_id: ClientId) -> Result<Vec<Account>, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut accounts: Vec<_> = data
            .values()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.opened_on.cmp(&b.opened_on).then(a.account_number.cmp(&b.account_number)));
        Ok(accounts)
    }

    /// Check if an account number is already taken by another account
    pub fn account_number_exists(
        &self,
        account_number: &str,
        exclude_id: Option<AccountId>,
    ) -> Result<bool, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .any(|a| a.account_number == account_number && Some(a.id) != exclude_id))
    }

    pub fn count(&self) -> Result<usize, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

impl EntityStore<Account> for AccountRepository {
    type Id = AccountId;

    fn get(&self, id: AccountId) -> Result<Option<Account>, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    fn exists(&self, id: AccountId) -> Result<bool, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&id))
    }

    fn save(&self, account: Account) -> Result<Account, BankError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| BankError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let previous = data.insert(account.id, account.clone());
        if let Err(e) = self.write_out(&data) {
            match previous {
                Some(old) => data.insert(account.id, old),
                None => data.remove(&account.id),
            };
            return Err(e);
        }
        Ok(account)
    }

    fn delete(&self, id: AccountId) -> Result<bool, BankError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| BankError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let Some(removed) = data.remove(&id) else {
            return Ok(false);
        };
        if let Err(e) = self.write_out(&data) {
            data.insert(id, removed);
            return Err(e);
        }
        Ok(true)
    }
}
