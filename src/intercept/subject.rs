//! Subject resolution
//!
//! Every audit record and change event names the owning client. For
//! account operations the client is looked up from the account's
//! `client_id`.

use crate::models::ClientId;
use crate::storage::{ClientRepository, EntityStore};

/// Resolves a client id to the email sent with change events
pub trait SubjectResolver: Send + Sync {
    /// Email of the client, if it can be found
    fn subject_email(&self, client_id: ClientId) -> Option<String>;
}

impl<T: SubjectResolver + ?Sized> SubjectResolver for &T {
    fn subject_email(&self, client_id: ClientId) -> Option<String> {
        (**self).subject_email(client_id)
    }
}

impl SubjectResolver for ClientRepository {
    fn subject_email(&self, client_id: ClientId) -> Option<String> {
        match self.get(client_id) {
            Ok(client) => client.map(|c| c.email),
            Err(e) => {
                tracing::warn!(
                    client_id = %client_id.full(),
                    error = %e,
                    "Subject lookup failed; sending empty email"
                );
                None
            }
        }
    }
}
