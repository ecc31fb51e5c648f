//! Per-call invocation context

use uuid::Uuid;

/// Actor recorded when nobody is authenticated
pub const SYSTEM_ACTOR: &str = "system";

/// Who is calling, passed explicitly to every audited operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    /// Authenticated actor, if any
    pub actor_id: Option<String>,

    /// Correlates the audit record, the change event and the log lines of
    /// one request
    pub request_id: Uuid,
}

impl OperationContext {
    /// Context for an authenticated actor
    pub fn for_actor(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            request_id: Uuid::new_v4(),
        }
    }

    /// Context with no authenticated actor
    pub fn system() -> Self {
        Self {
            actor_id: None,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// The actor id, or `"system"`
    pub fn actor(&self) -> &str {
        self.actor_or(SYSTEM_ACTOR)
    }

    /// The actor id, or `fallback` when absent or blank
    pub fn actor_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.actor_id.as_deref() {
            Some(actor) if !actor.trim().is_empty() => actor,
            _ => fallback,
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::system()
    }
}
