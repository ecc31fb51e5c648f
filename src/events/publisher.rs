//! Event publisher
//!
//! Turns an operation outcome into a `ChangeEvent` and hands it to the
//! transport. Publishing is fire-and-forget: handoff errors are logged
//! here, delivery errors are logged from the delivery callback, and
//! nothing is retried or returned to the caller.

use std::sync::Arc;

use super::event::{ChangeEvent, EventOperation};
use super::transport::{DeliveryCallback, MessageTransport};
use crate::audit::{event_encoding, Auditable, ChangeSet};
use crate::config::EventSettings;

/// Message key used when the entity cannot be identified
pub const UNKNOWN_KEY: &str = "UNKNOWN";

/// What a publish call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Handed to the transport; delivery is reported asynchronously
    HandedOff,
    /// The originating operation did not succeed, so nothing was sent
    Suppressed,
    /// The handoff failed; the failure has been logged
    Failed,
}

/// Message key for an entity: its identifier, or `"UNKNOWN"`
pub fn message_key<E: Auditable>(entity: Option<&E>) -> String {
    entity
        .map(|e| e.audit_id())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| UNKNOWN_KEY.to_string())
}

/// Publishes change events for client and account operations
#[derive(Clone)]
pub struct EventPublisher {
    transport: Arc<dyn MessageTransport>,
    settings: EventSettings,
}

impl EventPublisher {
    pub fn new(transport: Arc<dyn MessageTransport>, settings: EventSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Topic for an entity label
    pub fn topic_for(&self, label: &str) -> &str {
        if label == crate::models::Account::LABEL {
            &self.settings.account_topic
        } else {
            &self.settings.client_topic
        }
    }

    /// Publish a creation: the identifier as attribute, the full encoding after
    pub fn publish_create<E: Auditable>(
        &self,
        actor_id: &str,
        entity: Option<&E>,
        subject_email: &str,
        succeeded: bool,
    ) -> PublishOutcome {
        let event = ChangeEvent {
            actor_id: actor_id.to_string(),
            subject_id: entity.map(|e| e.subject_id()).unwrap_or_default(),
            subject_email: subject_email.to_string(),
            operation_type: EventOperation::Create,
            attribute_names: entity.map(|e| e.audit_id()).unwrap_or_default(),
            before_value: String::new(),
            after_value: entity.map(|e| e.encode()).unwrap_or_default(),
        };
        self.dispatch(E::LABEL, &message_key(entity), &event, succeeded && entity.is_some())
    }

    /// Publish an update using the bare comma-joined encoding
    pub fn publish_update<E: Auditable>(
        &self,
        actor_id: &str,
        entity: &E,
        changes: &ChangeSet,
        subject_email: &str,
        succeeded: bool,
    ) -> PublishOutcome {
        let event = self.update_event(actor_id, entity, changes, subject_email);
        self.dispatch(E::LABEL, &message_key(Some(entity)), &event, succeeded)
    }

    /// Publish a deletion of `entity_id`
    pub fn publish_delete(
        &self,
        actor_id: &str,
        entity_type_label: &str,
        entity_id: &str,
        subject_id: &str,
        subject_email: &str,
        succeeded: bool,
    ) -> PublishOutcome {
        let key = if entity_id.is_empty() {
            UNKNOWN_KEY
        } else {
            entity_id
        };
        let event = ChangeEvent {
            actor_id: actor_id.to_string(),
            subject_id: subject_id.to_string(),
            subject_email: subject_email.to_string(),
            operation_type: EventOperation::Delete,
            attribute_names: entity_id.to_string(),
            before_value: format!("{} with ID: {}", entity_type_label, entity_id),
            after_value: String::new(),
        };
        self.dispatch(entity_type_label, key, &event, succeeded)
    }

    /// Publish a verification, carried on the wire as an UPDATE
    pub fn publish_verification<E: Auditable>(
        &self,
        actor_id: &str,
        entity: &E,
        changes: &ChangeSet,
        subject_email: &str,
        succeeded: bool,
    ) -> PublishOutcome {
        let event = self.update_event(actor_id, entity, changes, subject_email);
        self.dispatch(E::LABEL, &message_key(Some(entity)), &event, succeeded)
    }

    fn update_event<E: Auditable>(
        &self,
        actor_id: &str,
        entity: &E,
        changes: &ChangeSet,
        subject_email: &str,
    ) -> ChangeEvent {
        let encoded = event_encoding(changes);
        ChangeEvent {
            actor_id: actor_id.to_string(),
            subject_id: entity.subject_id(),
            subject_email: subject_email.to_string(),
            operation_type: EventOperation::Update,
            attribute_names: encoded.field_names,
            before_value: encoded.before,
            after_value: encoded.after,
        }
    }

    fn dispatch(
        &self,
        label: &str,
        key: &str,
        event: &ChangeEvent,
        succeeded: bool,
    ) -> PublishOutcome {
        if !succeeded {
            tracing::debug!(entity = label, key, "Operation did not succeed; event suppressed");
            return PublishOutcome::Suppressed;
        }

        let topic = self.topic_for(label).to_string();
        let payload = match event.to_payload(&topic) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(topic = %topic, key, error = %e, "Failed to encode change event");
                return PublishOutcome::Failed;
            }
        };

        match self
            .transport
            .publish(&topic, key, payload, succeeded, delivery_logger(event.operation_type))
        {
            Ok(()) => PublishOutcome::HandedOff,
            Err(e) => {
                tracing::error!(
                    transport = self.transport.name(),
                    topic = %topic,
                    key,
                    error = %e,
                    "Failed to hand change event to transport"
                );
                PublishOutcome::Failed
            }
        }
    }
}

fn delivery_logger(operation: EventOperation) -> DeliveryCallback {
    Box::new(move |result| match result {
        Ok(report) => tracing::info!(
            topic = %report.topic,
            key = %report.key,
            offset = report.offset,
            operation = %operation,
            "Change event delivered"
        ),
        Err(e) => tracing::error!(
            operation = %operation,
            error = %e,
            "Change event delivery failed"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::diff;
    use crate::events::transport::MemoryTransport;
    use crate::models::{Account, AccountType, Client};

    fn publisher() -> (EventPublisher, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let publisher = EventPublisher::new(transport.clone(), EventSettings::default());
        (publisher, transport)
    }

    fn payload(transport: &MemoryTransport, index: usize) -> ChangeEvent {
        serde_json::from_str(&transport.sent()[index].payload).unwrap()
    }

    #[test]
    fn test_nothing_sent_when_operation_failed() {
        let (publisher, transport) = publisher();
        let client = Client::new("John", "Doe", "john@example.com");
        let mut changes = ChangeSet::new();
        changes.push("firstName", "John", "Bob");

        assert_eq!(
            publisher.publish_create("system", Some(&client), "", false),
            PublishOutcome::Suppressed
        );
        assert_eq!(
            publisher.publish_update("system", &client, &changes, "", false),
            PublishOutcome::Suppressed
        );
        assert_eq!(
            publisher.publish_delete("system", "Client", "c1", "c1", "", false),
            PublishOutcome::Suppressed
        );
        assert_eq!(
            publisher.publish_verification("system", &client, &changes, "", false),
            PublishOutcome::Suppressed
        );
        assert_eq!(transport.sent_count(), 0);
    }

    #[test]
    fn test_publish_create() {
        let (publisher, transport) = publisher();
        let client = Client::new("John", "Doe", "john@example.com");

        let outcome = publisher.publish_create("teller-7", Some(&client), &client.email, true);
        assert_eq!(outcome, PublishOutcome::HandedOff);

        let sent = transport.sent();
        assert_eq!(sent[0].topic, "client-events");
        assert_eq!(sent[0].key, client.id.full());

        let event = payload(&transport, 0);
        assert_eq!(event.operation_type, EventOperation::Create);
        assert_eq!(event.actor_id, "teller-7");
        assert_eq!(event.subject_email, "john@example.com");
        assert_eq!(event.before_value, "");
        assert!(event.after_value.contains("John"));
    }

    #[test]
    fn test_publish_update_uses_bare_encoding() {
        let (publisher, transport) = publisher();
        let before = Client::new("John", "Doe", "john@example.com");
        let mut after = before.clone();
        after.first_name = "Bob".into();
        after.last_name = "Smith".into();
        let changes = diff(Some(&before), Some(&after)).unwrap();

        publisher.publish_update("system", &after, &changes, &after.email, true);

        let event = payload(&transport, 0);
        assert_eq!(event.operation_type, EventOperation::Update);
        assert_eq!(event.attribute_names, "firstName,lastName");
        assert_eq!(event.before_value, "John,Doe");
        assert_eq!(event.after_value, "Bob,Smith");
    }

    #[test]
    fn test_account_events_use_account_topic_and_key() {
        let (publisher, transport) = publisher();
        let client = Client::new("John", "Doe", "john@example.com");
        let account = Account::new(client.id, "ACC-1", AccountType::Savings);

        publisher.publish_create("system", Some(&account), &client.email, true);

        let sent = transport.sent();
        assert_eq!(sent[0].topic, "account-events");
        assert_eq!(sent[0].key, account.id.full());
        assert_eq!(payload(&transport, 0).subject_id, client.id.full());
    }

    #[test]
    fn test_unknown_key_sentinel() {
        assert_eq!(message_key::<Client>(None), "UNKNOWN");

        let (publisher, transport) = publisher();
        publisher.publish_delete("system", "Client", "", "c1", "", true);
        assert_eq!(transport.sent()[0].key, "UNKNOWN");
    }

    #[test]
    fn test_publish_delete() {
        let (publisher, transport) = publisher();
        publisher.publish_delete("system", "Account", "a1", "c1", "john@example.com", true);

        let sent = transport.sent();
        assert_eq!(sent[0].topic, "account-events");
        assert_eq!(sent[0].key, "a1");

        let event = payload(&transport, 0);
        assert_eq!(event.operation_type, EventOperation::Delete);
        assert_eq!(event.before_value, "Account with ID: a1");
        assert_eq!(event.after_value, "");
        assert_eq!(event.subject_id, "c1");
    }

    #[test]
    fn test_create_without_entity_is_suppressed() {
        let (publisher, transport) = publisher();
        let outcome = publisher.publish_create::<Client>("system", None, "", true);
        assert_eq!(outcome, PublishOutcome::Suppressed);
        assert_eq!(transport.sent_count(), 0);
    }

    #[test]
    fn test_transport_failures_are_absorbed() {
        let (publisher, transport) = publisher();
        let client = Client::new("John", "Doe", "john@example.com");

        transport.fail_handoff(true);
        assert_eq!(
            publisher.publish_create("system", Some(&client), "", true),
            PublishOutcome::Failed
        );

        transport.fail_handoff(false);
        transport.fail_delivery(true);
        assert_eq!(
            publisher.publish_create("system", Some(&client), "", true),
            PublishOutcome::HandedOff
        );
    }
}
