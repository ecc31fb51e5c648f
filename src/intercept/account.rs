//! Audited account operations
//!
//! Account records and events are filed under the owning client: the
//! subject id is the account's `client_id` and the subject email is looked
//! up through a `SubjectResolver`.

use super::context::OperationContext;
use super::pipeline::{AuditPipeline, Mutation};
use super::subject::SubjectResolver;
use crate::error::BankResult;
use crate::models::{Account, AccountId};
use crate::services::{AccountOperations, AccountUpdate, NewAccount};

/// Wraps account operations with audit records and change events
pub struct AuditedAccountService<S, R> {
    inner: S,
    resolver: R,
    pipeline: AuditPipeline,
}

impl<S: AccountOperations, R: SubjectResolver> AuditedAccountService<S, R> {
    pub fn new(inner: S, resolver: R, pipeline: AuditPipeline) -> Self {
        Self {
            inner,
            resolver,
            pipeline,
        }
    }

    /// The undecorated service
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn create(&self, ctx: &OperationContext, new: NewAccount) -> BankResult<Account> {
        self.pipeline
            .run_create(ctx, || self.inner.create(new), |a| self.owner_email(a))
    }

    pub fn get(&self, ctx: &OperationContext, id: AccountId) -> BankResult<Account> {
        self.pipeline.run_read(ctx, || self.inner.get(id))
    }

    pub fn update(
        &self,
        ctx: &OperationContext,
        id: AccountId,
        update: AccountUpdate,
    ) -> BankResult<Account> {
        let before = self.snapshot(id);
        self.pipeline.run_mutation(
            ctx,
            Mutation::Update,
            before,
            || self.inner.update(id, update),
            |a| self.owner_email(a),
        )
    }

    pub fn delete(&self, ctx: &OperationContext, id: AccountId) -> BankResult<()> {
        let before = self.snapshot(id);
        self.pipeline.run_delete(
            ctx,
            &id.full(),
            before,
            || self.inner.delete(id),
            |a| self.owner_email(a),
        )
    }

    pub fn verify(&self, ctx: &OperationContext, id: AccountId) -> BankResult<Account> {
        let before = self.snapshot(id);
        self.pipeline.run_mutation(
            ctx,
            Mutation::Verify,
            before,
            || self.inner.verify(id),
            |a| self.owner_email(a),
        )
    }

    fn owner_email(&self, account: &Account) -> String {
        self.resolver
            .subject_email(account.client_id)
            .unwrap_or_default()
    }

    fn snapshot(&self, id: AccountId) -> Option<Account> {
        self.inner.find(id).unwrap_or_else(|e| {
            tracing::warn!(account_id = %id.full(), error = %e, "Snapshot lookup failed");
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::audit::{MemoryAuditStore, OperationType};
    use crate::config::{BankPaths, Settings};
    use crate::events::{ChangeEvent, EventOperation, MemoryTransport};
    use crate::models::{AccountType, Client, ClientId, Money};
    use crate::services::{AccountService, ClientOperations, ClientService, NewClient};
    use crate::storage::{ClientRepository, EntityStore, Storage};
    use tempfile::TempDir;

    type Service<'a> = AuditedAccountService<AccountService<'a>, &'a ClientRepository>;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BankPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn create_service(
        storage: &Storage,
    ) -> (Service<'_>, Arc<MemoryAuditStore>, Arc<MemoryTransport>) {
        let store = Arc::new(MemoryAuditStore::new());
        let transport = Arc::new(MemoryTransport::new());
        let pipeline =
            AuditPipeline::with_parts(store.clone(), transport.clone(), Settings::default());
        let service =
            AuditedAccountService::new(AccountService::new(storage), &storage.clients, pipeline);
        (service, store, transport)
    }

    fn create_owner(storage: &Storage) -> Client {
        ClientService::new(storage)
            .create(NewClient {
                first_name: "Jane".into(),
                last_name: "Roe".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            })
            .unwrap()
    }

    fn event(transport: &MemoryTransport, index: usize) -> ChangeEvent {
        serde_json::from_str(&transport.sent()[index].payload).unwrap()
    }

    #[test]
    fn test_create_is_filed_under_owner() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, store, transport) = create_service(&storage);

        let account = service
            .create(
                &OperationContext::for_actor("teller-7"),
                NewAccount::new(owner.id, "ACC-1", AccountType::Checking),
            )
            .unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].operation_type, OperationType::Create);
        assert_eq!(records[0].subject_id, owner.id.full());
        assert_eq!(records[0].field_name, account.id.full());

        let sent = transport.sent();
        assert_eq!(sent[0].topic, "account-events");
        assert_eq!(sent[0].key, account.id.full());
        let event = event(&transport, 0);
        assert_eq!(event.subject_id, owner.id.full());
        assert_eq!(event.subject_email, "jane@example.com");
    }

    #[test]
    fn test_update_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, store, transport) = create_service(&storage);
        let ctx = OperationContext::system();
        let account = service
            .create(&ctx, NewAccount::new(owner.id, "ACC-1", AccountType::Checking))
            .unwrap();

        service
            .update(
                &ctx,
                account.id,
                AccountUpdate {
                    balance: Some(Money::from_cents(1250)),
                    ..Default::default()
                },
            )
            .unwrap();

        let records = store.records();
        let update = &records[1];
        assert_eq!(update.field_name, "balance");
        assert_eq!(update.before_value, "balance: 0.00");
        assert_eq!(update.after_value, "balance: 12.50");

        let event = event(&transport, 1);
        assert_eq!(event.attribute_names, "balance");
        assert_eq!(event.before_value, "0.00");
        assert_eq!(event.after_value, "12.50");
    }

    #[test]
    fn test_verify_activates_and_records_status() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, store, transport) = create_service(&storage);
        let ctx = OperationContext::system();
        let account = service
            .create(&ctx, NewAccount::new(owner.id, "ACC-1", AccountType::Savings))
            .unwrap();

        service.verify(&ctx, account.id).unwrap();

        let records = store.records();
        let record = &records[1];
        assert_eq!(record.operation_type, OperationType::Update);
        assert_eq!(record.field_name, "status");
        assert_eq!(record.before_value, "status: PENDING");
        assert_eq!(record.after_value, "status: ACTIVE");
        assert_eq!(event(&transport, 1).operation_type, EventOperation::Update);
    }

    #[test]
    fn test_delete_account() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, store, transport) = create_service(&storage);
        let ctx = OperationContext::system();
        let account = service
            .create(&ctx, NewAccount::new(owner.id, "ACC-1", AccountType::Checking))
            .unwrap();

        service.delete(&ctx, account.id).unwrap();

        let records = store.records();
        let delete = &records[1];
        assert_eq!(delete.operation_type, OperationType::Delete);
        assert_eq!(
            delete.before_value,
            format!("Account with ID: {}", account.id.full())
        );
        assert_eq!(delete.after_value, "");
        assert_eq!(delete.subject_id, owner.id.full());

        let event = event(&transport, 1);
        assert_eq!(event.operation_type, EventOperation::Delete);
        assert_eq!(event.subject_email, "jane@example.com");
    }

    #[test]
    fn test_read_account() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, store, _transport) = create_service(&storage);
        let ctx = OperationContext::system();
        let account = service
            .create(&ctx, NewAccount::new(owner.id, "ACC-1", AccountType::Checking))
            .unwrap();

        service.get(&ctx, account.id).unwrap();

        let records = store.records();
        let read = &records[1];
        assert_eq!(read.operation_type, OperationType::Read);
        assert_eq!(read.before_value, read.after_value);
        assert_eq!(read.subject_id, owner.id.full());
    }

    #[test]
    fn test_failed_create_leaves_no_trace() {
        let (_temp_dir, storage) = create_test_storage();
        let (service, store, transport) = create_service(&storage);

        let result = service.create(
            &OperationContext::system(),
            NewAccount::new(ClientId::new(), "ACC-1", AccountType::Checking),
        );

        assert!(result.unwrap_err().is_not_found());
        assert!(store.is_empty());
        assert_eq!(transport.sent_count(), 0);
    }

    #[test]
    fn test_missing_owner_sends_empty_email() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = create_owner(&storage);
        let (service, _store, transport) = create_service(&storage);
        let ctx = OperationContext::system();
        let account = service
            .create(&ctx, NewAccount::new(owner.id, "ACC-1", AccountType::Checking))
            .unwrap();
        storage.clients.delete(owner.id).unwrap();

        service
            .update(
                &ctx,
                account.id,
                AccountUpdate {
                    currency: Some("EUR".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(event(&transport, 1).subject_email, "");
    }
}
