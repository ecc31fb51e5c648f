//! Core data models for bank-audit
//!
//! Clients, the accounts they own, and the ID and money types shared by
//! both.

pub mod account;
pub mod client;
pub mod ids;
pub mod money;

pub use account::{Account, AccountStatus, AccountType};
pub use client::{Client, ClientStatus};
pub use ids::{AccountId, AuditId, ClientId};
pub use money::Money;
