//! Configuration module for bank-audit
//!
//! - Data directory resolution
//! - Service settings persistence

pub mod paths;
pub mod settings;

pub use paths::BankPaths;
pub use settings::{AuditSettings, EventSettings, Settings};
