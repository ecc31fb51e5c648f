//! Client service
//!
//! CRUD and verification for clients.

use chrono::NaiveDate;

use super::ClientOperations;
use crate::error::{BankError, BankResult};
use crate::models::{Client, ClientId, ClientStatus};
use crate::storage::{EntityStore, Storage};

/// Input for creating a client
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

/// Partial update of a client; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

/// Service for client management
pub struct ClientService<'a> {
    storage: &'a Storage,
}

impl<'a> ClientService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn check_email_free(&self, email: &str, exclude: Option<ClientId>) -> BankResult<()> {
        if self.storage.clients.email_exists(email, exclude)? {
            return Err(BankError::Duplicate {
                entity_type: "Client",
                identifier: email.to_string(),
            });
        }
        Ok(())
    }
}

impl ClientOperations for ClientService<'_> {
    fn create(&self, new: NewClient) -> BankResult<Client> {
        let mut client = Client::new(
            new.first_name.trim(),
            new.last_name.trim(),
            new.email.trim(),
        );
        client.phone_number = new.phone_number;
        client.date_of_birth = new.date_of_birth;
        client.address = new.address;

        client
            .validate()
            .map_err(|e| BankError::Validation(e.to_string()))?;

        self.check_email_free(&client.email, None)?;

        self.storage.clients.save(client)
    }

    fn get(&self, id: ClientId) -> BankResult<Client> {
        self.find(id)?
            .ok_or_else(|| BankError::client_not_found(id.full()))
    }

    fn find(&self, id: ClientId) -> BankResult<Option<Client>> {
        self.storage.clients.get(id)
    }

    fn update(&self, id: ClientId, update: ClientUpdate) -> BankResult<Client> {
        let mut client = self.get(id)?;

        if let Some(first_name) = update.first_name {
            client.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            client.last_name = last_name.trim().to_string();
        }
        if let Some(email) = update.email {
            let email = email.trim().to_string();
            self.check_email_free(&email, Some(id))?;
            client.email = email;
        }
        if let Some(phone_number) = update.phone_number {
            client.phone_number = Some(phone_number);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            client.date_of_birth = Some(date_of_birth);
        }
        if let Some(address) = update.address {
            client.address = Some(address);
        }
        if let Some(status) = update.status {
            client.status = status;
        }

        client
            .validate()
            .map_err(|e| BankError::Validation(e.to_string()))?;

        self.storage.clients.save(client)
    }

    fn delete(&self, id: ClientId) -> BankResult<()> {
        if !self.storage.clients.exists(id)? {
            return Err(BankError::client_not_found(id.full()));
        }

        let open_accounts = self.storage.accounts.get_by_client(id)?;
        if !open_accounts.is_empty() {
            return Err(BankError::Conflict(format!(
                "Client {} still owns {} account(s)",
                id,
                open_accounts.len()
            )));
        }

        self.storage.clients.delete(id)?;
        Ok(())
    }

    fn verify(&self, id: ClientId) -> BankResult<Client> {
        let mut client = self.get(id)?;

        if client.status == ClientStatus::Closed {
            return Err(BankError::Validation(
                "Closed clients cannot be verified".into(),
            ));
        }
        if client.verified {
            return Ok(client);
        }

        client.verified = true;
        self.storage.clients.save(client)
    }
}
