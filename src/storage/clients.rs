//! Client repository for JSON storage
//!
//! Manages loading and saving clients to clients.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::BankError;
use crate::models::{Client, ClientId};

use super::file_io::{read_json, write_json_atomic};
use super::EntityStore;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ClientData {
    clients: Vec<Client>,
}

/// Repository for client persistence
pub struct ClientRepository {
    path: PathBuf,
    data: RwLock<HashMap<ClientId, Client>>,
}

impl ClientRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load clients from disk
    pub fn load(&self) -> Result<(), BankError> {
        let file_data: ClientData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| BankError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for client in file_data.clients {
            data.insert(client.id, client);
        }

        Ok(())
    }

    /// Write the given map to disk
    ///
    /// Callers hold the write lock, so writes to the file never overlap.
    fn write_out(&self, data: &HashMap<ClientId, Client>) -> Result<(), BankError> {
        let mut clients: Vec<_> = data.values().cloned().collect();
        clients.sort_by(|a, b| a.last_name.cmp(&b.last_name).then(a.first_name.cmp(&b.first_name)));

        write_json_atomic(&self.path, &ClientData { clients })
    }

    /// All clients sorted by name
    pub fn get_all(&self) -> Result<Vec<Client>, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut clients: Vec<_> = data.values().cloned().collect();
        clients.sort_by(|a, b| a.last_name.cmp(&b.last_name).then(a.first_name.cmp(&b.first_name)));
        Ok(clients)
    }

    /// Find a client by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<Client>, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let email_lower = email.to_lowercase();
        Ok(data
            .values()
            .find(|c| c.email.to_lowercase() == email_lower)
            .cloned())
    }

    /// Check if an email is already taken by another client
    pub fn email_exists(&self, email: &str, exclude_id: Option<ClientId>) -> Result<bool, BankError> {
        Ok(self
            .get_by_email(email)?
            .is_some_and(|c| Some(c.id) != exclude_id))
    }

    pub fn count(&self) -> Result<usize, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

impl EntityStore<Client> for ClientRepository {
    type Id = ClientId;

    fn get(&self, id: ClientId) -> Result<Option<Client>, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    fn exists(&self, id: ClientId) -> Result<bool, BankError> {
        let data = self
            .data
            .read()
            .map_err(|e| BankError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&id))
    }

    fn save(&self, client: Client) -> Result<Client, BankError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| BankError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let previous = data.insert(client.id, client.clone());
        if let Err(e) = self.write_out(&data) {
            // Memory must not run ahead of the file
            match previous {
                Some(old) => data.insert(client.id, old),
                None => data.remove(&client.id),
            };
            return Err(e);
        }
        Ok(client)
    }

    fn delete(&self, id: ClientId) -> Result<bool, BankError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ClientRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clients.json");
        let repo = ClientRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let client = Client::new("John", "Doe", "john@example.com");
        let id = client.id;

        repo.save(client).unwrap();

        assert!(repo.exists(id).unwrap());
        assert_eq!(repo.get(id).unwrap().unwrap().first_name, "John");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let client = Client::new("Jane", "Roe", "jane@example.com");
        let id = client.id;
        repo.save(client).unwrap();

        let repo2 = ClientRepository::new(temp_dir.path().join("clients.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().last_name, "Roe");
    }

    #[test]
    fn test_email_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        let client = Client::new("John", "Doe", "John@Example.com");
        let id = client.id;
        repo.save(client).unwrap();

        assert!(repo.get_by_email("john@example.com").unwrap().is_some());
        assert!(repo.email_exists("JOHN@example.com", None).unwrap());
        assert!(!repo.email_exists("john@example.com", Some(id)).unwrap());
        assert!(!repo.email_exists("other@example.com", None).unwrap());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let client = Client::new("John", "Doe", "john@example.com");
        let id = client.id;
        repo.save(client).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.exists(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let (temp_dir, repo) = create_test_repo();
        let mut client = Client::new("John", "Doe", "john@example.com");
        let id = client.id;
        repo.save(client.clone()).unwrap();

        // A directory in the temp file's place makes the next write fail
        std::fs::create_dir(temp_dir.path().join("clients.json.tmp")).unwrap();

        client.first_name = "Bob".into();
        assert!(matches!(repo.save(client), Err(BankError::Storage(_))));
        assert_eq!(repo.get(id).unwrap().unwrap().first_name, "John");

        let stranger = Client::new("Amy", "Adams", "amy@example.com");
        let stranger_id = stranger.id;
        assert!(repo.save(stranger).is_err());
        assert!(!repo.exists(stranger_id).unwrap());

        assert!(repo.delete(id).is_err());
        assert!(repo.exists(id).unwrap());
    }

    #[test]
    fn test_concurrent_saves_all_succeed() {
        let (temp_dir, repo) = create_test_repo();
        let repo = std::sync::Arc::new(repo);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let repo = std::sync::Arc::clone(&repo);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let email = format!("c{}-{}@example.com", t, i);
                        repo.save(Client::new("First", "Last", &email)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reloaded = ClientRepository::new(temp_dir.path().join("clients.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 200);
    }

    #[test]
    fn test_get_all_sorted_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.save(Client::new("Zed", "Young", "z@example.com")).unwrap();
        repo.save(Client::new("Amy", "Adams", "a@example.com")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].last_name, "Adams");
        assert_eq!(all[1].last_name, "Young");
    }
}
