//! Service settings for bank-audit
//!
//! Controls the actor sentinel, event topics, and which audit side effects
//! are active.

use serde::{Deserialize, Serialize};

use super::paths::BankPaths;
use crate::error::BankError;

/// Audit trail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Whether audit records are written at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether READ operations produce an audit record
    #[serde(default = "default_true")]
    pub record_reads: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            record_reads: true,
        }
    }
}

/// Change-event publishing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSettings {
    /// Whether change events are published
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Topic for client change events
    #[serde(default = "default_client_topic")]
    pub client_topic: String,

    /// Topic for account change events
    #[serde(default = "default_account_topic")]
    pub account_topic: String,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            client_topic: default_client_topic(),
            account_topic: default_account_topic(),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Actor recorded when a request carries no authenticated identity
    #[serde(default = "default_system_actor")]
    pub system_actor: String,

    #[serde(default)]
    pub audit: AuditSettings,

    #[serde(default)]
    pub events: EventSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_system_actor() -> String {
    "system".to_string()
}

fn default_client_topic() -> String {
    "client-events".to_string()
}

fn default_account_topic() -> String {
    "account-events".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            system_actor: default_system_actor(),
            audit: AuditSettings::default(),
            events: EventSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &BankPaths) -> Result<Self, BankError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| BankError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                BankError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BankPaths) -> Result<(), BankError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BankError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| BankError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would make events unroutable
    pub fn validate(&self) -> Result<(), BankError> {
        if self.system_actor.trim().is_empty() {
            return Err(BankError::Config("system_actor cannot be empty".into()));
        }
        if self.events.client_topic.trim().is_empty()
            || self.events.account_topic.trim().is_empty()
        {
            return Err(BankError::Config("event topics cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.system_actor, "system");
        assert!(settings.audit.enabled);
        assert!(settings.audit.record_reads);
        assert_eq!(settings.events.client_topic, "client-events");
        assert_eq!(settings.events.account_topic, "account-events");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BankPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.audit.record_reads = false;
        settings.events.client_topic = "bank.clients".into();

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert!(!loaded.audit.record_reads);
        assert_eq!(loaded.events.client_topic, "bank.clients");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BankPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"audit": {"record_reads": false}}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert!(loaded.audit.enabled);
        assert!(!loaded.audit.record_reads);
        assert_eq!(loaded.system_actor, "system");
    }

    #[test]
    fn test_empty_topic_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BankPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"events": {"client_topic": ""}}"#).unwrap();

        let result = Settings::load_or_create(&paths);
        assert!(matches!(result, Err(BankError::Config(_))));
    }
}
