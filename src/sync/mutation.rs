use super::resolver::IdentityResolver;
use crate::core::{EmployeeChanges, Record, Resolution, Result, StoreError, SyncError, WriteMode};
use crate::storage::RecordStore;
use std::sync::Arc;
use tracing::info;

/// Update and delete of records that must already exist.
///
/// Unlike `UpsertCoordinator`, an absent identifier is a `NotFound` error and
/// never falls back to an insert.
pub struct MutationService<S: ?Sized> {
    resolver: IdentityResolver<S>,
}

impl<S: ?Sized> Clone for MutationService<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: RecordStore + ?Sized> MutationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: IdentityResolver::new(store),
        }
    }

    pub fn resolver(&self) -> &IdentityResolver<S> {
        &self.resolver
    }

    pub async fn update(&self, id: &S::Id, changes: &EmployeeChanges) -> Result<S::Record> {
        let mut existing = match self.resolver.resolve(Some(id)).await? {
            Resolution::Found(record) => record,
            Resolution::Absent => return Err(SyncError::not_found(id)),
        };

        existing.apply(changes);
        let store = self.resolver.store();
        let updated = store
            .write(existing, WriteMode::Update)
            .await
            .map_err(|err| match err {
                StoreError::Missing(_) => SyncError::not_found(id),
                other => other.into(),
            })?;

        info!(backend = store.backend(), %id, "record updated");
        Ok(updated)
    }

    /// Returns the record as it was just before deletion.
    pub async fn delete(&self, id: &S::Id) -> Result<S::Record> {
        let snapshot = match self.resolver.resolve(Some(id)).await? {
            Resolution::Found(record) => record,
            Resolution::Absent => return Err(SyncError::not_found(id)),
        };

        let store = self.resolver.store();
        if !store.delete_by_id(id).await? {
            // removed by a concurrent request after the resolve
            return Err(SyncError::not_found(id));
        }

        info!(backend = store.backend(), %id, "record deleted");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Employee, MirrorEmployee};
    use crate::storage::{EmployeeStore, InMemoryEmployeeStore, InMemoryMirrorStore, MirrorStore};

    fn service(records: Vec<Employee>) -> (Arc<EmployeeStore>, MutationService<EmployeeStore>) {
        let store: Arc<EmployeeStore> = Arc::new(InMemoryEmployeeStore::with_records(records));
        (Arc::clone(&store), MutationService::new(store))
    }

    #[tokio::test]
    async fn update_applies_changes_and_keeps_identity() {
        let (store, service) = service(vec![Employee::with_id(1, "Alice", "Developer")]);

        let updated = service
            .update(&1, &EmployeeChanges::new("Alice Updated", "Manager"))
            .await
            .unwrap();

        assert_eq!(updated, Employee::with_id(1, "Alice Updated", "Manager"));
        assert_eq!(store.find_by_id(&1).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_of_absent_id_never_inserts() {
        let (store, service) = service(vec![]);

        let err = service
            .update(&1, &EmployeeChanges::new("X", "Y"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_returns_the_pre_deletion_snapshot() {
        let (store, service) = service(vec![Employee::with_id(1, "Bob", "QA")]);

        let deleted = service.delete(&1).await.unwrap();

        assert_eq!(deleted, Employee::with_id(1, "Bob", "QA"));
        assert!(store.find_by_id(&1).await.unwrap().is_none());
        assert_eq!(
            service.resolver().resolve(Some(&1)).await.unwrap(),
            Resolution::Absent
        );
    }

    #[tokio::test]
    async fn delete_of_absent_id_is_not_found() {
        let (store, service) = service(vec![Employee::with_id(2, "Jane", "Manager")]);

        let err = service.delete(&1).await.unwrap_err();

        assert!(matches!(err, SyncError::NotFound(ref id) if id == "1"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mutates_mirror_documents_by_string_id() {
        let store: Arc<MirrorStore> = Arc::new(InMemoryMirrorStore::with_records([
            MirrorEmployee::with_id("100", "Santiago", "Developer"),
        ]));
        let service = MutationService::new(store);
        let id = "100".to_string();

        let updated = service
            .update(&id, &EmployeeChanges::new("Santiago", "SM"))
            .await
            .unwrap();
        assert_eq!(updated.role, "SM");

        let deleted = service.delete(&id).await.unwrap();
        assert_eq!(deleted, updated);
        assert!(service.delete(&id).await.unwrap_err().is_not_found());
    }
}
