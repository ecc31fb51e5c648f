//! Account model
//!
//! Represents a bank account owned by exactly one client.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, ClientId};
use super::money::Money;
use crate::audit::{Auditable, FieldSpec};

/// Type of bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Credit,
    Loan,
}

impl AccountType {
    /// Symbolic name used in audit encodings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::Credit => "CREDIT",
            Self::Loan => "LOAN",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Opened but not yet reviewed
    #[default]
    Pending,
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Frozen => "FROZEN",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,

    /// Owning client
    pub client_id: ClientId,

    /// Customer-facing account number
    pub account_number: String,

    pub account_type: AccountType,

    pub balance: Money,

    /// ISO 4217 currency code
    pub currency: String,

    #[serde(default)]
    pub status: AccountStatus,

    pub opened_on: NaiveDate,
}

impl Account {
    /// Create a new pending account opened today
    pub fn new(
        client_id: ClientId,
        account_number: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id: AccountId::new(),
            client_id,
            account_number: account_number.into(),
            account_type,
            balance: Money::zero(),
            currency: "USD".to_string(),
            status: AccountStatus::Pending,
            opened_on: Utc::now().date_naive(),
        }
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.account_number.trim().is_empty() {
            return Err(AccountValidationError::EmptyAccountNumber);
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AccountValidationError::InvalidCurrency(self.currency.clone()));
        }

        if self.balance.is_negative() && !matches!(self.account_type, AccountType::Credit | AccountType::Loan) {
            return Err(AccountValidationError::NegativeBalance(self.balance));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.account_number, self.account_type)
    }
}

const ACCOUNT_FIELDS: &[FieldSpec<Account>] = &[
    FieldSpec::new("clientId", |a| Some(a.client_id.full())),
    FieldSpec::new("accountNumber", |a| Some(a.account_number.clone())),
    FieldSpec::new("accountType", |a| Some(a.account_type.as_str().to_string())),
    FieldSpec::new("balance", |a| Some(a.balance.to_decimal_string())),
    FieldSpec::new("currency", |a| Some(a.currency.clone())),
    FieldSpec::new("status", |a| Some(a.status.as_str().to_string())),
    FieldSpec::new("openedOn", |a| Some(a.opened_on.to_string())),
];

impl Auditable for Account {
    const LABEL: &'static str = "Account";

    fn audit_fields() -> &'static [FieldSpec<Self>] {
        ACCOUNT_FIELDS
    }

    fn audit_id(&self) -> String {
        self.id.full()
    }

    fn subject_id(&self) -> String {
        self.client_id.full()
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyAccountNumber,
    InvalidCurrency(String),
    NegativeBalance(Money),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAccountNumber => write!(f, "Account number cannot be empty"),
            Self::InvalidCurrency(code) => write!(f, "Invalid currency code: '{}'", code),
            Self::NegativeBalance(balance) => {
                write!(f, "Deposit accounts cannot have a negative balance ({})", balance)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
