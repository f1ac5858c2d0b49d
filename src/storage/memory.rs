use super::RecordStore;
use crate::core::{Employee, MirrorEmployee, Record, StoreError, StoreResult, WriteMode};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identity source used when a record is inserted without one.
pub trait IdAllocator<Id>: Send + Sync {
    fn allocate(&self) -> Id;

    /// Called for every identity that enters the store, generated or not.
    fn observe(&self, _id: &Id) {}
}

/// Auto-increment sequence, the in-process stand-in for `BIGSERIAL`.
#[derive(Debug, Default)]
pub struct Sequence {
    last: AtomicI64,
}

impl IdAllocator<i64> for Sequence {
    fn allocate(&self) -> i64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn observe(&self, id: &i64) {
        self.last.fetch_max(*id, Ordering::SeqCst);
    }
}

/// Random document identities, rendered as simple (dash-less) UUIDs.
#[derive(Debug, Default)]
pub struct DocumentIds;

impl IdAllocator<String> for DocumentIds {
    fn allocate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// In-process collection with a unique key on the record identity.
///
/// Rows are kept in insertion order. Every method takes the lock once, so a
/// single call is atomic, but nothing serializes a read followed by a write.
pub struct MemoryStore<R: Record, A> {
    rows: RwLock<Vec<R>>,
    ids: A,
    _record: PhantomData<fn() -> R>,
}

pub type InMemoryEmployeeStore = MemoryStore<Employee, Sequence>;
pub type InMemoryMirrorStore = MemoryStore<MirrorEmployee, DocumentIds>;

impl<R, A> MemoryStore<R, A>
where
    R: Record,
    A: IdAllocator<R::Id> + Default,
{
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            ids: A::default(),
            _record: PhantomData,
        }
    }

    /// Seeds the store. Records without an identity get one allocated.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let ids = A::default();
        let mut rows: Vec<R> = Vec::new();
        for mut record in records {
            let id = match record.id() {
                Some(id) => id.clone(),
                None => ids.allocate(),
            };
            ids.observe(&id);
            record.set_id(id.clone());
            rows.retain(|row| row.id() != Some(&id));
            rows.push(record);
        }

        Self {
            rows: RwLock::new(rows),
            ids,
            _record: PhantomData,
        }
    }
}

impl<R: Record, A> MemoryStore<R, A> {
    /// Replaces the whole collection, e.g. to roll back a mutation that
    /// could not be made durable.
    pub async fn restore(&self, records: Vec<R>) {
        *self.rows.write().await = records;
    }
}

impl<R, A> Default for MemoryStore<R, A>
where
    R: Record,
    A: IdAllocator<R::Id> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

fn position<R: Record>(rows: &[R], id: &R::Id) -> Option<usize> {
    rows.iter().position(|row| row.id() == Some(id))
}

#[async_trait]
impl<R, A> RecordStore for MemoryStore<R, A>
where
    R: Record,
    A: IdAllocator<R::Id> + 'static,
{
    type Id = R::Id;
    type Record = R;

    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, id: &R::Id) -> StoreResult<Option<R>> {
        let rows = self.rows.read().await;
        Ok(position(&rows, id).map(|idx| rows[idx].clone()))
    }

    async fn find_all(&self) -> StoreResult<Vec<R>> {
        Ok(self.rows.read().await.clone())
    }

    async fn write(&self, mut record: R, mode: WriteMode) -> StoreResult<R> {
        let mut rows = self.rows.write().await;

        match mode {
            WriteMode::Insert => {
                let id = match record.id() {
                    Some(id) => id.clone(),
                    None => self.ids.allocate(),
                };
                if position(&rows, &id).is_some() {
                    return Err(StoreError::DuplicateKey(id.to_string()));
                }
                self.ids.observe(&id);
                record.set_id(id);
                rows.push(record.clone());
            }
            WriteMode::Update => {
                let id = record
                    .id()
                    .cloned()
                    .ok_or_else(|| StoreError::Missing("<none>".to_string()))?;
                let idx =
                    position(&rows, &id).ok_or_else(|| StoreError::Missing(id.to_string()))?;
                rows[idx] = record.clone();
            }
            WriteMode::Upsert => {
                let id = record.id().cloned().ok_or_else(|| {
                    StoreError::Unsupported("upsert requires an identifier".to_string())
                })?;
                match position(&rows, &id) {
                    Some(idx) => rows[idx] = record.clone(),
                    None => {
                        self.ids.observe(&id);
                        rows.push(record.clone());
                    }
                }
            }
        }

        Ok(record)
    }

    async fn delete_by_id(&self, id: &R::Id) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        match position(&rows, id) {
            Some(idx) => {
                rows.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.rows.read().await.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
