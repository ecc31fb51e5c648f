//! Change-event publishing
//!
//! - `event`: the `ChangeEvent` wire format
//! - `transport`: the `MessageTransport` trait and an in-memory transport
//! - `outbox`: a transport that writes to an outbox file on a worker thread
//! - `publisher`: `EventPublisher`, one method per operation kind

mod event;
mod outbox;
mod publisher;
mod transport;

pub use event::{ChangeEvent, EventOperation};
pub use outbox::{OutboxMessage, OutboxTransport};
pub use publisher::{message_key, EventPublisher, PublishOutcome, UNKNOWN_KEY};
pub use transport::{DeliveryCallback, DeliveryReport, MemoryTransport, MessageTransport, SentMessage};
