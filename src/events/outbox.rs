//! Outbox transport
//!
//! Messages are handed to a background worker over a channel and appended
//! by the worker to a JSONL outbox file, from which a relay can forward
//! them to the real broker. The caller never waits on the file write; the
//! outcome arrives through the delivery callback.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transport::{DeliveryCallback, DeliveryReport, MessageTransport};
use crate::error::{AuditError, AuditResult};

/// One line of the outbox file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub offset: u64,
    pub topic: String,
    pub key: String,
    /// Serialized change event
    pub payload: String,
    pub enqueued_at: DateTime<Utc>,
}

struct OutboxJob {
    topic: String,
    key: String,
    payload: String,
    enqueued_at: DateTime<Utc>,
    on_delivery: DeliveryCallback,
}

/// Transport that appends messages to an outbox file on a worker thread
pub struct OutboxTransport {
    path: PathBuf,
    sender: Mutex<Option<Sender<OutboxJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl OutboxTransport {
    /// Start the worker thread writing to `path`
    pub fn start(path: PathBuf) -> AuditResult<Self> {
        let next_offset = count_lines(&path);
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();

        let worker = std::thread::Builder::new()
            .name("outbox-writer".into())
            .spawn(move || run_worker(worker_path, receiver, next_offset))
            .map_err(|e| AuditError::transport("outbox", format!("Failed to start worker: {}", e)))?;

        tracing::info!(path = %path.display(), "Outbox transport started");

        Ok(Self {
            path,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop accepting messages and wait for queued ones to be written
    pub fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::error!("Outbox worker panicked");
            }
        }
    }

    /// Read every message written so far
    pub fn read_all(&self) -> AuditResult<Vec<OutboxMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| AuditError::transport("outbox", format!("Failed to read outbox: {}", e)))?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    AuditError::transport("outbox", format!("Failed to parse outbox line: {}", e))
                })
            })
            .collect()
    }
}

impl MessageTransport for OutboxTransport {
    fn send(
        &self,
        topic: &str,
        key: &str,
        payload: String,
        on_delivery: DeliveryCallback,
    ) -> AuditResult<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|e| AuditError::transport(topic, format!("lock poisoned: {}", e)))?;
        let sender = sender
            .as_ref()
            .ok_or_else(|| AuditError::transport(topic, "outbox transport is shut down"))?;

        let job = OutboxJob {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
            enqueued_at: Utc::now(),
            on_delivery,
        };

        sender
            .send(job)
            .map_err(|_| AuditError::transport(topic, "outbox worker has stopped"))
    }

    fn name(&self) -> &str {
        "outbox"
    }
}

impl Drop for OutboxTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(path: PathBuf, receiver: Receiver<OutboxJob>, mut next_offset: u64) {
    for job in receiver {
        let message = OutboxMessage {
            offset: next_offset,
            topic: job.topic,
            key: job.key,
            payload: job.payload,
            enqueued_at: job.enqueued_at,
        };

        match append_line(&path, &message) {
            Ok(()) => {
                next_offset += 1;
                (job.on_delivery)(Ok(DeliveryReport {
                    topic: message.topic,
                    key: message.key,
                    offset: message.offset,
                }));
            }
            Err(e) => (job.on_delivery)(Err(e)),
        }
    }
    tracing::debug!(path = %path.display(), "Outbox worker stopped");
}

fn append_line(path: &Path, message: &OutboxMessage) -> AuditResult<()> {
    let json = serde_json::to_string(message)
        .map_err(|e| AuditError::transport(&message.topic, format!("Failed to serialize: {}", e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AuditError::transport(&message.topic, format!("Failed to open outbox: {}", e)))?;

    writeln!(file, "{}", json)
        .and_then(|_| file.flush())
        .map_err(|e| AuditError::transport(&message.topic, format!("Failed to write outbox: {}", e)))
}

fn count_lines(path: &Path) -> u64 {
    std::fs::read_to_string(path)
        .map(|contents| contents.lines().filter(|l| !l.trim().is_empty()).count() as u64)
        .unwrap_or(0)
}
