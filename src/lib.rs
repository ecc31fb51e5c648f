//! bank-audit - Client and account services with an audit trail
//!
//! This library manages banking clients and the accounts they own. Every
//! successful operation on either is mirrored into an append-only audit
//! trail and, separately, published as a change event for downstream
//! consumers. Audit and event failures are logged and never reach the
//! caller of the business operation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path management and settings
//! - `error`: Custom error types
//! - `models`: Clients, accounts, IDs and money
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer, unaware of auditing
//! - `audit`: Diffing, audit records and the audit log
//! - `events`: Change events and message transports
//! - `intercept`: Audited wrappers around the services
//! - `export`: Audit trail export (CSV, JSON, YAML)
//!
//! # Example
//!
//! ```rust,ignore
//! use bank_audit::config::{BankPaths, Settings};
//! use bank_audit::intercept::{AuditPipeline, AuditedClientService, OperationContext};
//! use bank_audit::services::{ClientService, NewClient};
//! use bank_audit::storage::Storage;
//!
//! let paths = BankPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths.clone())?;
//! storage.load_all()?;
//!
//! let pipeline = AuditPipeline::open(&paths, settings)?;
//! let clients = AuditedClientService::new(ClientService::new(&storage), pipeline);
//! let client = clients.create(&OperationContext::for_actor("teller-7"), new_client)?;
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod intercept;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AuditError, BankError};
