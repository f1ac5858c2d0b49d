//! Store abstraction shared by the store of record, its replica and the
//! document mirror.
//!
//! Each backend is an independent resource: nothing here spans two stores,
//! and no backend coordinates with another.

pub mod json_file;
pub mod memory;
pub mod postgres;

use crate::core::{Employee, EmployeeId, MirrorEmployee, MirrorId, StoreResult, WriteMode};
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub use json_file::JsonFileMirrorStore;
pub use memory::{InMemoryEmployeeStore, InMemoryMirrorStore, MemoryStore};
pub use postgres::PgEmployeeStore;

/// Thin data-mapping layer over one collection of records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static;
    type Record: crate::core::Record<Id = Self::Id>;

    /// Creates the table or collection if it does not exist yet.
    async fn init(&self) -> StoreResult<()>;

    async fn find_by_id(&self, id: &Self::Id) -> StoreResult<Option<Self::Record>>;

    async fn find_all(&self) -> StoreResult<Vec<Self::Record>>;

    /// Applies `record` according to `mode` and returns the stored state.
    ///
    /// - `Insert` assigns an identity when the record has none and fails with
    ///   `DuplicateKey` when the identity is already taken.
    /// - `Update` fails with `Missing` when the identity is unknown.
    /// - `Upsert` requires an identity and is atomic with respect to other
    ///   writers of the same store.
    async fn write(&self, record: Self::Record, mode: WriteMode) -> StoreResult<Self::Record>;

    /// Returns `false` when nothing matched.
    async fn delete_by_id(&self, id: &Self::Id) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.find_all().await?.len())
    }

    /// Short backend label used in log fields.
    fn backend(&self) -> &'static str;
}

/// Relational store of record (and its secondary replica).
pub type EmployeeStore = dyn RecordStore<Id = EmployeeId, Record = Employee>;

/// Document-oriented mirror.
pub type MirrorStore = dyn RecordStore<Id = MirrorId, Record = MirrorEmployee>;
