//! Message transport abstraction
//!
//! A transport takes a keyed payload for a topic and delivers it
//! asynchronously. Delivery outcome is reported through a callback that is
//! only used for logging.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{AuditError, AuditResult};

/// Confirmation of a delivered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub key: String,
    /// Transport-assigned position of the message
    pub offset: u64,
}

/// Invoked once with the delivery outcome
pub type DeliveryCallback = Box<dyn FnOnce(AuditResult<DeliveryReport>) + Send + 'static>;

/// Core trait for message transports
pub trait MessageTransport: Send + Sync {
    /// Hand a message to the transport
    ///
    /// Returning `Ok` means the handoff succeeded; delivery is reported
    /// later through `on_delivery`.
    fn send(
        &self,
        topic: &str,
        key: &str,
        payload: String,
        on_delivery: DeliveryCallback,
    ) -> AuditResult<()>;

    /// Transport name (e.g. "memory", "outbox")
    fn name(&self) -> &str;

    /// Publish a message only if the originating operation succeeded
    fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: String,
        succeeded: bool,
        on_delivery: DeliveryCallback,
    ) -> AuditResult<()> {
        if !succeeded {
            tracing::debug!(
                transport = self.name(),
                topic,
                key,
                "Originating operation failed; message not sent"
            );
            return Ok(());
        }
        self.send(topic, key, payload, on_delivery)
    }
}

/// A message captured by `MemoryTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// In-memory transport that delivers synchronously
///
/// Handoff and delivery failures can be switched on to exercise the error
/// paths.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<SentMessage>>,
    next_offset: AtomicU64,
    fail_handoff: AtomicBool,
    fail_delivery: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent handoff
    pub fn fail_handoff(&self, fail: bool) {
        self.fail_handoff.store(fail, Ordering::SeqCst);
    }

    /// Accept handoffs but report every delivery as failed
    pub fn fail_delivery(&self, fail: bool) {
        self.fail_delivery.store(fail, Ordering::SeqCst);
    }

    /// Messages accepted so far, in send order
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

impl MessageTransport for MemoryTransport {
    fn send(
        &self,
        topic: &str,
        key: &str,
        payload: String,
        on_delivery: DeliveryCallback,
    ) -> AuditResult<()> {
        if self.fail_handoff.load(Ordering::SeqCst) {
            return Err(AuditError::transport(topic, "transport unavailable"));
        }

        {
            let mut sent = self
                .sent
                .lock()
                .map_err(|e| AuditError::transport(topic, format!("lock poisoned: {}", e)))?;
            sent.push(SentMessage {
                topic: topic.to_string(),
                key: key.to_string(),
                payload,
            });
        }

        if self.fail_delivery.load(Ordering::SeqCst) {
            on_delivery(Err(AuditError::transport(topic, "delivery rejected")));
        } else {
            let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
            on_delivery(Ok(DeliveryReport {
                topic: topic.to_string(),
                key: key.to_string(),
                offset,
            }));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recording_callback() -> (DeliveryCallback, Arc<Mutex<Vec<bool>>>) {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        let callback: DeliveryCallback = Box::new(move |result| {
            sink.lock().unwrap().push(result.is_ok());
        });
        (callback, outcomes)
    }

    #[test]
    fn test_publish_skips_when_not_succeeded() {
        let transport = MemoryTransport::new();
        let (callback, outcomes) = recording_callback();

        transport
            .publish("client-events", "c1", "{}".into(), false, callback)
            .unwrap();

        assert_eq!(transport.sent_count(), 0);
        assert!(outcomes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_sends_when_succeeded() {
        let transport = MemoryTransport::new();
        let (callback, outcomes) = recording_callback();

        transport
            .publish("client-events", "c1", "{}".into(), true, callback)
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "client-events");
        assert_eq!(sent[0].key, "c1");
        assert_eq!(*outcomes.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_handoff_failure() {
        let transport = MemoryTransport::new();
        transport.fail_handoff(true);
        let (callback, outcomes) = recording_callback();

        let result = transport.send("client-events", "c1", "{}".into(), callback);
        assert!(matches!(result, Err(AuditError::Transport { .. })));
        assert_eq!(transport.sent_count(), 0);
        assert!(outcomes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delivery_failure_reported_through_callback() {
        let transport = MemoryTransport::new();
        transport.fail_delivery(true);
        let (callback, outcomes) = recording_callback();

        transport
            .send("client-events", "c1", "{}".into(), callback)
            .unwrap();
        assert_eq!(*outcomes.lock().unwrap(), vec![false]);
    }
}
