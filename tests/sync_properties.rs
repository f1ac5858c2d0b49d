use std::sync::Arc;

use async_trait::async_trait;
use employee_sync::core::{StoreResult, WriteMode};
use employee_sync::storage::{InMemoryEmployeeStore, InMemoryMirrorStore};
use employee_sync::{
    Employee, EmployeeChanges, EmployeeId, EmployeeStore, IdentityResolver, MirrorEmployee,
    MirrorSynchronizer, MutationService, RecordStore, Resolution, SyncError, UpsertCoordinator,
    UpsertStrategy,
};
use futures::TryStreamExt;
use tokio_test::assert_ok;

fn store_with(records: Vec<Employee>) -> Arc<EmployeeStore> {
    Arc::new(InMemoryEmployeeStore::with_records(records))
}

#[tokio::test]
async fn absent_ids_resolve_absent_and_mutations_fail_without_side_effects() {
    let store = store_with(vec![Employee::with_id(2, "Jane Smith", "Manager")]);
    let resolver = IdentityResolver::new(Arc::clone(&store));
    let mutations = MutationService::new(Arc::clone(&store));

    for id in [1, 3, 99] {
        assert_eq!(resolver.resolve(Some(&id)).await.unwrap(), Resolution::Absent);

        let update = mutations
            .update(&id, &EmployeeChanges::new("X", "Y"))
            .await
            .unwrap_err();
        assert!(update.is_not_found());
        assert!(mutations.delete(&id).await.unwrap_err().is_not_found());
    }

    assert_eq!(
        store.find_all().await.unwrap(),
        vec![Employee::with_id(2, "Jane Smith", "Manager")]
    );
}

#[tokio::test]
async fn upsert_creates_exactly_one_record_when_absent() {
    let store = store_with(vec![]);
    let upsert = UpsertCoordinator::new(Arc::clone(&store));

    let saved = upsert
        .upsert(Employee::with_id(1, "Alice", "Developer"))
        .await
        .unwrap();

    assert_eq!(saved, Employee::with_id(1, "Alice", "Developer"));
    assert_eq!(
        upsert.resolver().resolve(Some(&1)).await.unwrap(),
        Resolution::Found(saved)
    );
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn upsert_updates_in_place_when_present() {
    for strategy in [UpsertStrategy::ReadThenWrite, UpsertStrategy::Native] {
        let store = store_with(vec![Employee::with_id(1, "Alice", "Developer")]);
        let upsert = UpsertCoordinator::with_strategy(Arc::clone(&store), strategy);

        let saved = upsert
            .upsert(Employee::with_id(1, "Alice Updated", "Manager"))
            .await
            .unwrap();

        assert_eq!(saved, Employee::with_id(1, "Alice Updated", "Manager"));
        assert_eq!(store.count().await.unwrap(), 1, "strategy {strategy}");
    }
}

#[tokio::test]
async fn update_preserves_identity_and_never_creates() {
    let store = store_with(vec![]);
    let mutations = MutationService::new(Arc::clone(&store));

    let err = mutations
        .update(&1, &EmployeeChanges::new("X", "Y"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NotFound(_)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn delete_returns_the_pre_deletion_snapshot() {
    let store = store_with(vec![Employee::with_id(1, "Bob", "QA")]);
    let mutations = MutationService::new(Arc::clone(&store));

    let deleted = assert_ok!(mutations.delete(&1).await);

    assert_eq!(deleted, Employee::with_id(1, "Bob", "QA"));
    assert_eq!(
        mutations.resolver().resolve(Some(&1)).await.unwrap(),
        Resolution::Absent
    );
}

#[tokio::test]
async fn resynchronizing_twice_quadruples_the_mirror() {
    let documents: Vec<MirrorEmployee> = (0..3)
        .map(|i| MirrorEmployee::with_id(format!("doc-{i}"), format!("Employee {i}"), "Developer"))
        .collect();
    let sync = MirrorSynchronizer::new(
        store_with(vec![]),
        Arc::new(InMemoryMirrorStore::with_records(documents)),
    );

    let _: Vec<MirrorEmployee> = sync.resynchronize_mirror().try_collect().await.unwrap();
    assert_eq!(sync.mirror().count().await.unwrap(), 6);

    let _: Vec<MirrorEmployee> = sync.resynchronize_mirror().try_collect().await.unwrap();
    assert_eq!(sync.mirror().count().await.unwrap(), 12);
}

/// Store whose existence check is always stale: it reports every id as
/// absent while writes still hit the real collection.
struct StaleReads {
    inner: InMemoryEmployeeStore,
}

#[async_trait]
impl RecordStore for StaleReads {
    type Id = EmployeeId;
    type Record = Employee;

    async fn init(&self) -> StoreResult<()> {
        self.inner.init().await
    }

    async fn find_by_id(&self, _id: &EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(None)
    }

    async fn find_all(&self) -> StoreResult<Vec<Employee>> {
        self.inner.find_all().await
    }

    async fn write(&self, record: Employee, mode: WriteMode) -> StoreResult<Employee> {
        self.inner.write(record, mode).await
    }

    async fn delete_by_id(&self, id: &EmployeeId) -> StoreResult<bool> {
        self.inner.delete_by_id(id).await
    }

    fn backend(&self) -> &'static str {
        "stale"
    }
}

#[tokio::test]
async fn losing_the_create_race_is_a_conflict() {
    let store: Arc<EmployeeStore> = Arc::new(StaleReads {
        inner: InMemoryEmployeeStore::with_records(vec![Employee::with_id(1, "Alice", "Developer")]),
    });
    let upsert = UpsertCoordinator::new(Arc::clone(&store));

    let err = upsert
        .upsert(Employee::with_id(1, "Alice", "Manager"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::ConflictOnCreate(_)));
    assert_eq!(
        store.find_all().await.unwrap(),
        vec![Employee::with_id(1, "Alice", "Developer")]
    );
}

#[tokio::test]
async fn native_strategy_avoids_the_create_race() {
    let store: Arc<EmployeeStore> = Arc::new(StaleReads {
        inner: InMemoryEmployeeStore::with_records(vec![Employee::with_id(1, "Alice", "Developer")]),
    });
    let upsert = UpsertCoordinator::with_strategy(Arc::clone(&store), UpsertStrategy::Native);

    let saved = assert_ok!(upsert.upsert(Employee::with_id(1, "Alice", "Manager")).await);

    assert_eq!(saved, Employee::with_id(1, "Alice", "Manager"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_of_one_id_leave_one_row() {
    let store = store_with(vec![]);
    let upsert = UpsertCoordinator::new(Arc::clone(&store));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let upsert = upsert.clone();
            tokio::spawn(async move {
                upsert
                    .upsert(Employee::with_id(7, format!("Writer {i}"), "Developer"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        match handle.await.unwrap() {
            Ok(saved) => assert_eq!(saved.id, Some(7)),
            Err(err) => assert!(matches!(err, SyncError::ConflictOnCreate(_)), "{err}"),
        }
    }

    assert_eq!(store.count().await.unwrap(), 1);
}
