use crate::core::{
    Employee, EmployeeChanges, EmployeeId, MirrorEmployee, Resolution, Result, SyncError,
    validate_fields,
};
use crate::storage::{EmployeeStore, RecordStore};
use crate::sync::{
    IdentityResolver, MirrorSynchronizer, MutationService, UpsertCoordinator, UpsertStrategy,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Secondary relational store that follows the store of record.
struct Replica {
    store: Arc<EmployeeStore>,
    upsert: UpsertCoordinator<EmployeeStore>,
}

/// Employee operations against the store of record.
///
/// Committed writes are optionally followed by a write to the secondary
/// replica and to the document mirror. Those follow-up writes are independent:
/// their failures are logged and never undo or fail the primary write.
pub struct EmployeeService {
    resolver: IdentityResolver<EmployeeStore>,
    upsert: UpsertCoordinator<EmployeeStore>,
    mutations: MutationService<EmployeeStore>,
    synchronizer: Arc<MirrorSynchronizer>,
    replica: Option<Replica>,
    auto_mirror: bool,
}

impl EmployeeService {
    pub fn new(
        primary: Arc<EmployeeStore>,
        synchronizer: Arc<MirrorSynchronizer>,
        strategy: UpsertStrategy,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(Arc::clone(&primary)),
            upsert: UpsertCoordinator::with_strategy(Arc::clone(&primary), strategy),
            mutations: MutationService::new(primary),
            synchronizer,
            replica: None,
            auto_mirror: false,
        }
    }

    pub fn with_replica(mut self, store: Arc<EmployeeStore>) -> Self {
        let upsert = UpsertCoordinator::with_strategy(Arc::clone(&store), self.upsert.strategy());
        self.replica = Some(Replica { store, upsert });
        self
    }

    pub fn with_auto_mirror(mut self, enabled: bool) -> Self {
        self.auto_mirror = enabled;
        self
    }

    pub fn primary(&self) -> &Arc<EmployeeStore> {
        self.resolver.store()
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        Ok(self.primary().find_all().await?)
    }

    pub async fn get(&self, id: EmployeeId) -> Result<Employee> {
        match self.resolver.resolve(Some(&id)).await? {
            Resolution::Found(employee) => Ok(employee),
            Resolution::Absent => Err(SyncError::not_found(id)),
        }
    }

    /// Creates the employee, or overwrites name and role if its id exists.
    pub async fn save(&self, candidate: Employee) -> Result<Employee> {
        validate_fields(&candidate.name, &candidate.role).map_err(SyncError::Validation)?;

        let saved = self.upsert.upsert(candidate).await?;
        self.after_write(&saved).await;
        Ok(saved)
    }

    pub async fn update(&self, id: EmployeeId, changes: EmployeeChanges) -> Result<Employee> {
        changes.validate().map_err(SyncError::Validation)?;

        let updated = self.mutations.update(&id, &changes).await?;
        self.after_write(&updated).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EmployeeId) -> Result<Employee> {
        let deleted = self.mutations.delete(&id).await?;
        self.after_delete(id).await;
        Ok(deleted)
    }

    /// Pushes the current state of one employee into the mirror.
    pub async fn mirror(&self, id: EmployeeId) -> Result<MirrorEmployee> {
        let employee = self.get(id).await?;
        self.synchronizer.mirror_one(&employee).await
    }

    async fn after_write(&self, employee: &Employee) {
        if let Some(replica) = &self.replica {
            match replica.upsert.upsert(employee.clone()).await {
                Ok(_) => info!(id = ?employee.id, backend = replica.store.backend(), "replicated to secondary"),
                Err(err) => warn!(id = ?employee.id, error = %err, "secondary replication failed"),
            }
        }

        if self.auto_mirror {
            if let Err(err) = self.synchronizer.mirror_one(employee).await {
                warn!(id = ?employee.id, error = %err, "mirror write failed");
            }
        }
    }

    async fn after_delete(&self, id: EmployeeId) {
        if let Some(replica) = &self.replica {
            match replica.store.delete_by_id(&id).await {
                Ok(found) => info!(id, found, "secondary delete applied"),
                Err(err) => warn!(id, error = %err, "secondary delete failed"),
            }
        }

        if self.auto_mirror {
            if let Err(err) = self.synchronizer.mirror().delete_by_id(&id.to_string()).await {
                warn!(id, error = %err, "mirror delete failed");
            }
        }
    }
}
