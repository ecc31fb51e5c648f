//! Service layer for bank-audit
//!
//! Business logic on top of the storage layer: validation, uniqueness
//! checks and the client/account ownership link. Services know nothing
//! about auditing; `ClientOperations` and `AccountOperations` are the seams
//! the interception layer wraps.

pub mod account;
pub mod client;

pub use account::{AccountService, AccountUpdate, NewAccount};
pub use client::{ClientService, ClientUpdate, NewClient};

use crate::error::BankResult;
use crate::models::{Account, AccountId, Client, ClientId};

/// Client operations
pub trait ClientOperations {
    fn create(&self, new: NewClient) -> BankResult<Client>;

    /// Get a client, failing with NotFound when absent
    fn get(&self, id: ClientId) -> BankResult<Client>;

    /// Look up a client without treating absence as an error
    fn find(&self, id: ClientId) -> BankResult<Option<Client>>;

    fn update(&self, id: ClientId, update: ClientUpdate) -> BankResult<Client>;

    fn delete(&self, id: ClientId) -> BankResult<()>;

    /// Mark the client as KYC-verified
    fn verify(&self, id: ClientId) -> BankResult<Client>;
}

/// Account operations
pub trait AccountOperations {
    fn create(&self, new: NewAccount) -> BankResult<Account>;

    /// Get an account, failing with NotFound when absent
    fn get(&self, id: AccountId) -> BankResult<Account>;

    /// Look up an account without treating absence as an error
    fn find(&self, id: AccountId) -> BankResult<Option<Account>>;

    fn update(&self, id: AccountId, update: AccountUpdate) -> BankResult<Account>;

    fn delete(&self, id: AccountId) -> BankResult<()>;

    /// Activate an account after review
    fn verify(&self, id: AccountId) -> BankResult<Account>;
}
