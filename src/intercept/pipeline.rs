//! The audit/event pipeline run around every intercepted operation
//!
//! Each operation walks the same phases:
//!
//! ```text
//! Invoked -> ResultCaptured -> AuditAttempted -> EventAttempted -> Done
//! ```
//!
//! A business error returns straight from `Invoked`; nothing is recorded
//! and nothing is published. Side effects run in a fixed order (audit
//! first, then event) and each runs inside its own unwind boundary, so a
//! failing or panicking side effect never changes the business result.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::context::OperationContext;
use crate::audit::{diff, AuditLogger, AuditRecorder, AuditStore, Auditable, ChangeSet};
use crate::config::{BankPaths, Settings};
use crate::error::{BankError, BankResult};
use crate::events::{EventPublisher, MessageTransport, OutboxTransport};

/// Lifecycle phase of an intercepted operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Invoked,
    ResultCaptured,
    AuditAttempted,
    EventAttempted,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoked => "INVOKED",
            Self::ResultCaptured => "RESULT_CAPTURED",
            Self::AuditAttempted => "AUDIT_ATTEMPTED",
            Self::EventAttempted => "EVENT_ATTEMPTED",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutating operation, which decides how it is published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Update,
    Verify,
}

impl Mutation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Verify => "verify",
        }
    }
}

/// Recorder, publisher and the settings that switch them on
#[derive(Clone)]
pub struct AuditPipeline {
    recorder: AuditRecorder,
    publisher: EventPublisher,
    settings: Settings,
}

impl AuditPipeline {
    pub fn new(recorder: AuditRecorder, publisher: EventPublisher, settings: Settings) -> Self {
        Self {
            recorder,
            publisher,
            settings,
        }
    }

    /// Build a pipeline from a store and a transport
    pub fn with_parts(
        store: Arc<dyn AuditStore>,
        transport: Arc<dyn MessageTransport>,
        settings: Settings,
    ) -> Self {
        let publisher = EventPublisher::new(transport, settings.events.clone());
        Self::new(AuditRecorder::new(store), publisher, settings)
    }

    /// Pipeline writing to the audit log and the outbox under `paths`
    pub fn open(paths: &BankPaths, settings: Settings) -> BankResult<Self> {
        paths.ensure_directories()?;

        let logger = AuditLogger::new(paths.audit_log());
        let outbox = OutboxTransport::start(paths.outbox_file())
            .map_err(|e| BankError::Storage(format!("Failed to start outbox: {}", e)))?;

        Ok(Self::with_parts(
            Arc::new(logger),
            Arc::new(outbox),
            settings,
        ))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn actor<'a>(&'a self, ctx: &'a OperationContext) -> &'a str {
        ctx.actor_or(&self.settings.system_actor)
    }

    /// Run a create and, on success, record and publish it
    pub(crate) fn run_create<E, F, M>(
        &self,
        ctx: &OperationContext,
        op: F,
        subject_email: M,
    ) -> BankResult<E>
    where
        E: Auditable,
        F: FnOnce() -> BankResult<E>,
        M: FnOnce(&E) -> String,
    {
        let span = operation_span::<E>(ctx, "create");
        let _guard = span.enter();

        let entity = capture(op())?;
        let actor = self.actor(ctx);

        self.attempt(Phase::AuditAttempted, self.settings.audit.enabled, || {
            self.recorder
                .record_create(Some(&entity), &entity.subject_id(), actor);
        });

        self.attempt(Phase::EventAttempted, self.settings.events.enabled, || {
            let email = subject_email(&entity);
            self.publisher
                .publish_create(actor, Some(&entity), &email, true);
        });

        trace_phase(Phase::Done);
        Ok(entity)
    }

    /// Run a read and, on success, record the snapshot
    ///
    /// Reads are never published.
    pub(crate) fn run_read<E, F>(&self, ctx: &OperationContext, op: F) -> BankResult<E>
    where
        E: Auditable,
        F: FnOnce() -> BankResult<E>,
    {
        let span = operation_span::<E>(ctx, "read");
        let _guard = span.enter();

        let entity = capture(op())?;
        let actor = self.actor(ctx);
        let audit_reads = self.settings.audit.enabled && self.settings.audit.record_reads;

        self.attempt(Phase::AuditAttempted, audit_reads, || {
            self.recorder
                .record_read(Some(&entity), &entity.subject_id(), actor);
        });

        self.attempt(Phase::EventAttempted, false, || {});

        trace_phase(Phase::Done);
        Ok(entity)
    }

    /// Run an update or verification against a snapshot taken beforehand
    ///
    /// The audit record and the change event each compute their own diff of
    /// `before` against the result.
    pub(crate) fn run_mutation<E, F, M>(
        &self,
        ctx: &OperationContext,
        mutation: Mutation,
        before: Option<E>,
        op: F,
        subject_email: M,
    ) -> BankResult<E>
    where
        E: Auditable,
        F: FnOnce() -> BankResult<E>,
        M: FnOnce(&E) -> String,
    {
        let span = operation_span::<E>(ctx, mutation.as_str());
        let _guard = span.enter();

        let entity = capture(op())?;
        let actor = self.actor(ctx);

        self.attempt(Phase::AuditAttempted, self.settings.audit.enabled, || {
            if let Some((old, changes)) = changes_since(before.as_ref(), &entity) {
                self.recorder
                    .record_update(old, &entity, &entity.subject_id(), &changes, actor);
            }
        });

        self.attempt(Phase::EventAttempted, self.settings.events.enabled, || {
            let Some((_, changes)) = changes_since(before.as_ref(), &entity) else {
                return;
            };
            let email = subject_email(&entity);
            match mutation {
                Mutation::Update => {
                    self.publisher
                        .publish_update(actor, &entity, &changes, &email, true);
                }
                Mutation::Verify => {
                    self.publisher
                        .publish_verification(actor, &entity, &changes, &email, true);
                }
            }
        });

        trace_phase(Phase::Done);
        Ok(entity)
    }

    /// Run a delete whose snapshot was taken before the entity disappeared
    pub(crate) fn run_delete<E, F, M>(
        &self,
        ctx: &OperationContext,
        entity_id: &str,
        before: Option<E>,
        op: F,
        subject_email: M,
    ) -> BankResult<()>
    where
        E: Auditable,
        F: FnOnce() -> BankResult<()>,
        M: FnOnce(&E) -> String,
    {
        let span = operation_span::<E>(ctx, "delete");
        let _guard = span.enter();

        capture(op())?;
        let actor = self.actor(ctx);
        let subject_id = before.as_ref().map(|e| e.subject_id());

        self.attempt(Phase::AuditAttempted, self.settings.audit.enabled, || {
            self.recorder
                .record_delete(Some(entity_id), subject_id.as_deref(), E::LABEL, actor);
        });

        self.attempt(Phase::EventAttempted, self.settings.events.enabled, || {
            let email = before.as_ref().map(subject_email).unwrap_or_default();
            self.publisher.publish_delete(
                actor,
                E::LABEL,
                entity_id,
                subject_id.as_deref().unwrap_or_default(),
                &email,
                true,
            );
        });

        trace_phase(Phase::Done);
        Ok(())
    }

    /// Run one side effect behind an unwind boundary, then mark the phase
    fn attempt(&self, phase: Phase, enabled: bool, effect: impl FnOnce()) {
        if enabled {
            if catch_unwind(AssertUnwindSafe(effect)).is_err() {
                tracing::error!(
                    phase = %phase,
                    "Side effect panicked; business result unaffected"
                );
            }
        } else {
            tracing::trace!(phase = %phase, "Side effect disabled");
        }
        trace_phase(phase);
    }
}

fn operation_span<E: Auditable>(ctx: &OperationContext, operation: &'static str) -> tracing::Span {
    let span = tracing::debug_span!(
        "audited_operation",
        entity = E::LABEL,
        operation,
        request_id = %ctx.request_id,
    );
    {
        let _guard = span.enter();
        trace_phase(Phase::Invoked);
    }
    span
}

/// Pass the business result through, marking the phase on success
fn capture<T>(result: BankResult<T>) -> BankResult<T> {
    match result {
        Ok(value) => {
            trace_phase(Phase::ResultCaptured);
            Ok(value)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Operation failed; audit and event suppressed");
            Err(e)
        }
    }
}

fn trace_phase(phase: Phase) {
    tracing::debug!(phase = %phase, "Phase reached");
}

/// Diff `before` against `after`, logging instead of failing
fn changes_since<'b, E: Auditable>(before: Option<&'b E>, after: &E) -> Option<(&'b E, ChangeSet)> {
    match diff(before, Some(after)) {
        Ok(changes) => before.map(|old| (old, changes)),
        Err(e) => {
            tracing::warn!(
                entity = E::LABEL,
                id = %after.audit_id(),
                error = %e,
                "Cannot diff snapshots; side effect skipped"
            );
            None
        }
    }
}
