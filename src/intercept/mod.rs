//! Interception of client and account operations
//!
//! `AuditedClientService` and `AuditedAccountService` decorate the plain
//! services. The business call runs first; when it succeeds, the audit
//! record is written and then the change event is published. Neither side
//! effect can change what the caller gets back.
//!
//! # Example
//!
//! ```rust,ignore
//! use bank_audit::intercept::{AuditPipeline, AuditedClientService, OperationContext};
//!
//! let pipeline = AuditPipeline::open(&paths, settings)?;
//! let clients = AuditedClientService::new(ClientService::new(&storage), pipeline);
//! let client = clients.create(&OperationContext::for_actor("teller-7"), new_client)?;
//! ```

mod account;
mod client;
mod context;
mod pipeline;
mod subject;

pub use account::AuditedAccountService;
pub use client::AuditedClientService;
pub use context::{OperationContext, SYSTEM_ACTOR};
pub use pipeline::{AuditPipeline, Phase};
pub use subject::SubjectResolver;
