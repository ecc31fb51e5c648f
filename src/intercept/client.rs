//! Audited client operations

use super::context::OperationContext;
use super::pipeline::{AuditPipeline, Mutation};
use crate::error::BankResult;
use crate::models::{Client, ClientId};
use crate::services::{ClientOperations, ClientUpdate, NewClient};

/// Wraps client operations with audit records and change events
///
/// The wrapped service does the work; this type only observes it.
pub struct AuditedClientService<S> {
    inner: S,
    pipeline: AuditPipeline,
}

impl<S: ClientOperations> AuditedClientService<S> {
    pub fn new(inner: S, pipeline: AuditPipeline) -> Self {
        Self { inner, pipeline }
    }

    /// The undecorated service
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn create(&self, ctx: &OperationContext, new: NewClient) -> BankResult<Client> {
        self.pipeline
            .run_create(ctx, || self.inner.create(new), |c| c.email.clone())
    }

    pub fn get(&self, ctx: &OperationContext, id: ClientId) -> BankResult<Client> {
        self.pipeline.run_read(ctx, || self.inner.get(id))
    }

    pub fn update(
        &self,
        ctx: &OperationContext,
        id: ClientId,
        update: ClientUpdate,
    ) -> BankResult<Client> {
        let before = self.snapshot(id);
        self.pipeline.run_mutation(
            ctx,
            Mutation::Update,
            before,
            || self.inner.update(id, update),
            |c| c.email.clone(),
        )
    }

    pub fn delete(&self, ctx: &OperationContext, id: ClientId) -> BankResult<()> {
        let before = self.snapshot(id);
        self.pipeline.run_delete(
            ctx,
            &id.full(),
            before,
            || self.inner.delete(id),
            |c| c.email.clone(),
        )
    }

    pub fn verify(&self, ctx: &OperationContext, id: ClientId) -> BankResult<Client> {
        let before = self.snapshot(id);
        self.pipeline.run_mutation(
            ctx,
            Mutation::Verify,
            before,
            || self.inner.verify(id),
            |c| c.email.clone(),
        )
    }

    /// Pre-operation state; a failed lookup only costs the side effects
    fn snapshot(&self, id: ClientId) -> Option<Client> {
        self.inner.find(id).unwrap_or_else(|e| {
            tracing::warn!(client_id = %id.full(), error = %e, "Snapshot lookup failed");
            None
        })
    }
}
