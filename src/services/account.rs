//! Account service
//!
//! Opening, updating and closing accounts. Keeps each client's `accounts`
//! list in step with the account store.

use super::AccountOperations;
use crate::error::{BankError, BankResult};
use crate::models::{Account, AccountId, AccountStatus, AccountType, Client, ClientId, Money};
use crate::storage::{EntityStore, Storage};

/// Input for opening an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub client_id: ClientId,
    pub account_number: String,
    pub account_type: AccountType,
    /// Defaults to USD
    pub currency: Option<String>,
    pub opening_balance: Money,
}

impl NewAccount {
    pub fn new(client_id: ClientId, account_number: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            client_id,
            account_number: account_number.into(),
            account_type,
            currency: None,
            opening_balance: Money::zero(),
        }
    }
}

/// Partial update of an account; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub account_type: Option<AccountType>,
    pub balance: Option<Money>,
    pub currency: Option<String>,
    pub status: Option<AccountStatus>,
}

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn owner_or_not_found(&self, client_id: ClientId) -> BankResult<Client> {
        self.storage
            .clients
            .get(client_id)?
            .ok_or_else(|| BankError::client_not_found(client_id.full()))
    }
}

impl AccountOperations for AccountService<'_> {
    fn create(&self, new: NewAccount) -> BankResult<Account> {
        let mut owner = self.owner_or_not_found(new.client_id)?;

        let mut account = Account::new(new.client_id, new.account_number.trim(), new.account_type);
        account.balance = new.opening_balance;
        if let Some(currency) = new.currency {
            account.currency = currency.trim().to_uppercase();
        }

        account
            .validate()
            .map_err(|e| BankError::Validation(e.to_string()))?;

        if self
            .storage
            .accounts
            .account_number_exists(&account.account_number, None)?
        {
            return Err(BankError::Duplicate {
                entity_type: "Account",
                identifier: account.account_number,
            });
        }

        let account = self.storage.accounts.save(account)?;

        owner.accounts.push(account.id);
        self.storage.clients.save(owner)?;

        Ok(account)
    }

    fn get(&self, id: AccountId) -> BankResult<Account> {
        self.find(id)?
            .ok_or_else(|| BankError::account_not_found(id.full()))
    }

    fn find(&self, id: AccountId) -> BankResult<Option<Account>> {
        self.storage.accounts.get(id)
    }

    fn update(&self, id: AccountId, update: AccountUpdate) -> BankResult<Account> {
        let mut account = self.get(id)?;

        if account.status == AccountStatus::Closed && update.status.is_none() {
            return Err(BankError::Validation(
                "Closed accounts cannot be modified".into(),
            ));
        }

        if let Some(account_type) = update.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = update.balance {
            account.balance = balance;
        }
        if let Some(currency) = update.currency {
            account.currency = currency.trim().to_uppercase();
        }
        if let Some(status) = update.status {
            account.status = status;
        }

        account
            .validate()
            .map_err(|e| BankError::Validation(e.to_string()))?;

        self.storage.accounts.save(account)
    }

    fn delete(&self, id: AccountId) -> BankResult<()> {
        let account = self.get(id)?;

        self.storage.accounts.delete(id)?;

        // The owner may already be gone if data was edited by hand
        if let Some(mut owner) = self.storage.clients.get(account.client_id)? {
            owner.accounts.retain(|a| *a != id);
            self.storage.clients.save(owner)?;
        }

        Ok(())
    }

    fn verify(&self, id: AccountId) -> BankResult<Account> {
        let mut account = self.get(id)?;

        match account.status {
            AccountStatus::Closed => Err(BankError::Validation(
                "Closed accounts cannot be verified".into(),
            )),
            AccountStatus::Active => Ok(account),
            AccountStatus::Pending | AccountStatus::Frozen => {
                account.status = AccountStatus::Active;
                self.storage.accounts.save(account)
            }
        }
    }
}
