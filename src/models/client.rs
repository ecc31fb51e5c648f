//! Client model
//!
//! A bank client is the subject every audit record is ultimately about.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, ClientId};
use crate::audit::{Auditable, FieldSpec};

/// Lifecycle status of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    #[default]
    Active,
    Suspended,
    Closed,
}

impl ClientStatus {
    /// Symbolic name used in audit encodings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub status: ClientStatus,

    /// Whether KYC verification has been completed
    #[serde(default)]
    pub verified: bool,

    /// Accounts owned by this client
    #[serde(default)]
    pub accounts: Vec<AccountId>,
}

impl Client {
    /// Create a new, unverified client
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: ClientId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: None,
            date_of_birth: None,
            address: None,
            status: ClientStatus::Active,
            verified: false,
            accounts: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Validate the client
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ClientValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(ClientValidationError::EmptyLastName);
        }
        if !is_plausible_email(&self.email) {
            return Err(ClientValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.full_name(), self.email)
    }
}

const CLIENT_FIELDS: &[FieldSpec<Client>] = &[
    FieldSpec::new("firstName", |c| Some(c.first_name.clone())),
    FieldSpec::new("lastName", |c| Some(c.last_name.clone())),
    FieldSpec::new("email", |c| Some(c.email.clone())),
    FieldSpec::new("phoneNumber", |c| c.phone_number.clone()),
    FieldSpec::new("dateOfBirth", |c| c.date_of_birth.map(|d| d.to_string())),
    FieldSpec::new("address", |c| c.address.clone()),
    FieldSpec::new("status", |c| Some(c.status.as_str().to_string())),
    FieldSpec::new("verified", |c| Some(c.verified.to_string())),
];

impl Auditable for Client {
    const LABEL: &'static str = "Client";

    fn audit_fields() -> &'static [FieldSpec<Self>] {
        CLIENT_FIELDS
    }

    fn audit_id(&self) -> String {
        self.id.full()
    }

    fn subject_id(&self) -> String {
        self.id.full()
    }
}

/// Validation errors for clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    EmptyFirstName,
    EmptyLastName,
    InvalidEmail(String),
}

impl fmt::Display for ClientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "Client first name cannot be empty"),
            Self::EmptyLastName => write!(f, "Client last name cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
        }
    }
}

impl std::error::Error for ClientValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = Client::new("John", "Doe", "john@example.com");
        assert_eq!(client.full_name(), "John Doe");
        assert_eq!(client.status, ClientStatus::Active);
        assert!(!client.verified);
        assert!(client.accounts.is_empty());
    }

    #[test]
    fn test_validation() {
        let mut client = Client::new("John", "Doe", "john@example.com");
        assert!(client.validate().is_ok());

        client.first_name = "  ".into();
        assert_eq!(client.validate(), Err(ClientValidationError::EmptyFirstName));

        client.first_name = "John".into();
        client.email = "not-an-email".into();
        assert!(matches!(
            client.validate(),
            Err(ClientValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let mut client = Client::new("John", "Doe", "john@example.com");
        client.phone_number = Some("555-0100".into());

        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("\"firstName\":\"John\""));
        assert!(json.contains("\"phoneNumber\":\"555-0100\""));
        assert!(json.contains("\"status\":\"ACTIVE\""));

        let deserialized: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, client);
    }

    #[test]
    fn test_declared_fields_skip_id_and_accounts() {
        let names: Vec<_> = Client::audit_fields().iter().map(|f| f.name).collect();
        assert_eq!(names[0], "firstName");
        assert!(!names.contains(&"id"));
        assert!(!names.contains(&"accounts"));
    }
}
