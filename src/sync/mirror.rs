use super::upsert::{UpsertCoordinator, UpsertStrategy};
use crate::core::{Employee, MirrorEmployee, Result, SyncError, WriteMode};
use crate::storage::{EmployeeStore, MirrorStore, RecordStore};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Pushes state from the store of record into the document mirror.
///
/// Writes here are not coupled to the writes on the store of record; a
/// failure on one side leaves the other untouched and the mirror drifts
/// until the next successful sync.
pub struct MirrorSynchronizer {
    primary: Arc<EmployeeStore>,
    mirror: Arc<MirrorStore>,
    upsert: UpsertCoordinator<MirrorStore>,
}

impl MirrorSynchronizer {
    pub fn new(primary: Arc<EmployeeStore>, mirror: Arc<MirrorStore>) -> Self {
        Self::with_strategy(primary, mirror, UpsertStrategy::default())
    }

    pub fn with_strategy(
        primary: Arc<EmployeeStore>,
        mirror: Arc<MirrorStore>,
        strategy: UpsertStrategy,
    ) -> Self {
        let upsert = UpsertCoordinator::with_strategy(Arc::clone(&mirror), strategy);
        Self {
            primary,
            mirror,
            upsert,
        }
    }

    pub fn mirror(&self) -> &Arc<MirrorStore> {
        &self.mirror
    }

    /// Re-inserts a copy of every document currently in the mirror.
    ///
    /// Each copy keeps `name` and `role` and gets a fresh identity, so a
    /// mirror holding N documents holds 2N afterwards. The document set is
    /// read once up front; copies written during the run are not revisited.
    /// Use [`reconcile_from_primary`](Self::reconcile_from_primary) to bring
    /// the mirror in line with the store of record instead.
    pub fn resynchronize_mirror(&self) -> BoxStream<'static, Result<MirrorEmployee>> {
        let mirror = Arc::clone(&self.mirror);
        let snapshot = {
            let mirror = Arc::clone(&mirror);
            async move { mirror.find_all().await }
        };

        stream::once(snapshot)
            .map(|loaded| match loaded {
                Ok(documents) => {
                    info!(documents = documents.len(), "resynchronizing mirror");
                    stream::iter(documents.into_iter().map(Ok)).left_stream()
                }
                Err(err) => stream::iter(std::iter::once(Err(SyncError::from(err)))).right_stream(),
            })
            .flatten()
            .then(move |document: Result<MirrorEmployee>| {
                let mirror = Arc::clone(&mirror);
                async move {
                    let copy = document?.detached_copy();
                    let written = mirror.write(copy, WriteMode::Insert).await?;
                    debug!(id = ?written.id, "mirror document copied");
                    Ok::<MirrorEmployee, SyncError>(written)
                }
            })
            .boxed()
    }

    /// Insert-or-update of the mirror document carrying `record`'s identity.
    pub async fn mirror_one(&self, record: &Employee) -> Result<MirrorEmployee> {
        let Some(id) = record.id else {
            return Err(SyncError::validation(
                "cannot mirror an employee without an identifier",
            ));
        };

        let mirrored = self.upsert.upsert(MirrorEmployee::from_employee(record)).await?;
        debug!(id, "employee mirrored");
        Ok(mirrored)
    }

    /// Mirrors every record of the store of record, one `mirror_one` at a time.
    ///
    /// Documents with no counterpart in the store of record are left alone.
    pub async fn reconcile_from_primary(&self) -> Result<Vec<MirrorEmployee>> {
        let records = self.primary.find_all().await?;
        info!(records = records.len(), "reconciling mirror from store of record");

        stream::iter(records)
            .then(|record| async move { self.mirror_one(&record).await })
            .try_collect()
            .await
    }
}
