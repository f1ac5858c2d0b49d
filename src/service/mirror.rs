use crate::core::{
    EmployeeChanges, MirrorEmployee, MirrorId, Resolution, Result, SyncError, validate_fields,
};
use crate::storage::{MirrorStore, RecordStore};
use crate::sync::{IdentityResolver, MirrorSynchronizer, MutationService, UpsertCoordinator, UpsertStrategy};
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::info;

/// CRUD over the document mirror plus the bulk sync entry points.
pub struct MirrorService {
    resolver: IdentityResolver<MirrorStore>,
    upsert: UpsertCoordinator<MirrorStore>,
    mutations: MutationService<MirrorStore>,
    synchronizer: Arc<MirrorSynchronizer>,
}

impl MirrorService {
    pub fn new(synchronizer: Arc<MirrorSynchronizer>, strategy: UpsertStrategy) -> Self {
        let store = Arc::clone(synchronizer.mirror());
        Self {
            resolver: IdentityResolver::new(Arc::clone(&store)),
            upsert: UpsertCoordinator::with_strategy(Arc::clone(&store), strategy),
            mutations: MutationService::new(store),
            synchronizer,
        }
    }

    pub fn store(&self) -> &Arc<MirrorStore> {
        self.resolver.store()
    }

    pub async fn list(&self) -> Result<Vec<MirrorEmployee>> {
        Ok(self.store().find_all().await?)
    }

    pub async fn get(&self, id: &MirrorId) -> Result<MirrorEmployee> {
        match self.resolver.resolve(Some(id)).await? {
            Resolution::Found(document) => Ok(document),
            Resolution::Absent => Err(SyncError::not_found(id)),
        }
    }

    pub async fn save(&self, candidate: MirrorEmployee) -> Result<MirrorEmployee> {
        validate_fields(&candidate.name, &candidate.role).map_err(SyncError::Validation)?;
        self.upsert.upsert(candidate).await
    }

    pub async fn update(&self, id: &MirrorId, changes: EmployeeChanges) -> Result<MirrorEmployee> {
        changes.validate().map_err(SyncError::Validation)?;
        self.mutations.update(id, &changes).await
    }

    pub async fn delete(&self, id: &MirrorId) -> Result<MirrorEmployee> {
        self.mutations.delete(id).await
    }

    /// Runs one resynchronization pass and returns the documents it wrote.
    pub async fn resynchronize(&self) -> Result<Vec<MirrorEmployee>> {
        let written: Vec<MirrorEmployee> =
            self.synchronizer.resynchronize_mirror().try_collect().await?;
        info!(written = written.len(), "mirror resynchronization finished");
        Ok(written)
    }

    pub async fn reconcile(&self) -> Result<Vec<MirrorEmployee>> {
        self.synchronizer.reconcile_from_primary().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryEmployeeStore, InMemoryMirrorStore};

    fn service(documents: Vec<MirrorEmployee>) -> MirrorService {
        let sync = MirrorSynchronizer::new(
            Arc::new(InMemoryEmployeeStore::new()),
            Arc::new(InMemoryMirrorStore::with_records(documents)),
        );
        MirrorService::new(Arc::new(sync), UpsertStrategy::ReadThenWrite)
    }

    #[tokio::test]
    async fn save_without_id_generates_one() {
        let service = service(vec![]);
        let saved = service
            .save(MirrorEmployee::new("Santiago", "Developer"))
            .await
            .unwrap();

        let id = saved.id.clone().unwrap();
        assert_eq!(service.get(&id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn save_with_existing_id_overwrites_fields() {
        let service = service(vec![MirrorEmployee::with_id("100", "Santiago", "Developer")]);
        let saved = service
            .save(MirrorEmployee::with_id("100", "Santiago", "SM"))
            .await
            .unwrap();

        assert_eq!(saved, MirrorEmployee::with_id("100", "Santiago", "SM"));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resynchronize_reports_written_copies() {
        let service = service(vec![MirrorEmployee::with_id("300", "Camilo", "PO")]);
        let written = service.resynchronize().await.unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_of_unknown_document_is_not_found() {
        let service = service(vec![]);
        assert!(
            service
                .get(&"missing".to_string())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}
