use super::resolver::IdentityResolver;
use crate::core::{Record, Resolution, Result, StoreError, SyncError, WriteMode};
use crate::storage::RecordStore;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// How `upsert` reaches its insert-or-update decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpsertStrategy {
    /// Resolve first, then insert or update. Two concurrent upserts of the
    /// same absent id race; the loser gets `ConflictOnCreate`.
    #[default]
    ReadThenWrite,
    /// One atomic store call when the candidate carries an id. Candidates
    /// without an id still take the insert path.
    Native,
}

impl FromStr for UpsertStrategy {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "read-then-write" | "read_then_write" | "two-step" => Ok(Self::ReadThenWrite),
            "native" | "atomic" => Ok(Self::Native),
            other => Err(format!(
                "unknown upsert strategy '{other}', expected one of: read-then-write, native"
            )),
        }
    }
}

impl fmt::Display for UpsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadThenWrite => f.write_str("read-then-write"),
            Self::Native => f.write_str("native"),
        }
    }
}

/// The write chosen for an upsert candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePlan<R> {
    Insert(R),
    Update(R),
}

impl<R> WritePlan<R> {
    pub fn mode(&self) -> WriteMode {
        match self {
            WritePlan::Insert(_) => WriteMode::Insert,
            WritePlan::Update(_) => WriteMode::Update,
        }
    }

    pub fn record(&self) -> &R {
        match self {
            WritePlan::Insert(record) | WritePlan::Update(record) => record,
        }
    }

    pub fn into_record(self) -> R {
        match self {
            WritePlan::Insert(record) | WritePlan::Update(record) => record,
        }
    }
}

/// Insert-or-update decision.
///
/// A found record keeps its identity and takes the candidate's mutable
/// fields; an absent one means the candidate is inserted as given.
pub fn plan_upsert<R: Record>(resolution: Resolution<R>, candidate: R) -> WritePlan<R> {
    match resolution {
        Resolution::Found(mut existing) => {
            existing.apply(&candidate.changes());
            WritePlan::Update(existing)
        }
        Resolution::Absent => WritePlan::Insert(candidate),
    }
}

pub struct UpsertCoordinator<S: ?Sized> {
    resolver: IdentityResolver<S>,
    strategy: UpsertStrategy,
}

impl<S: ?Sized> Clone for UpsertCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            strategy: self.strategy,
        }
    }
}

impl<S: RecordStore + ?Sized> UpsertCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_strategy(store, UpsertStrategy::default())
    }

    pub fn with_strategy(store: Arc<S>, strategy: UpsertStrategy) -> Self {
        Self {
            resolver: IdentityResolver::new(store),
            strategy,
        }
    }

    pub fn strategy(&self) -> UpsertStrategy {
        self.strategy
    }

    pub fn resolver(&self) -> &IdentityResolver<S> {
        &self.resolver
    }

    pub async fn upsert(&self, candidate: S::Record) -> Result<S::Record> {
        let store = self.resolver.store();

        if self.strategy == UpsertStrategy::Native && candidate.id().is_some() {
            debug!(backend = store.backend(), id = ?candidate.id(), "native upsert");
            return Ok(store.write(candidate, WriteMode::Upsert).await?);
        }

        let id = candidate.id().cloned();
        let resolution = self.resolver.resolve(id.as_ref()).await?;
        let plan = plan_upsert(resolution, candidate);
        info!(
            backend = store.backend(),
            id = ?plan.record().id(),
            mode = %plan.mode(),
            "upsert branch chosen"
        );

        match plan {
            WritePlan::Insert(record) => {
                store
                    .write(record, WriteMode::Insert)
                    .await
                    .map_err(|err| match err {
                        StoreError::DuplicateKey(key) => SyncError::ConflictOnCreate(key),
                        other => other.into(),
                    })
            }
            WritePlan::Update(record) => {
                store
                    .write(record, WriteMode::Update)
                    .await
                    .map_err(|err| match err {
                        // deleted between resolve and write
                        StoreError::Missing(key) => SyncError::NotFound(key),
                        other => other.into(),
                    })
            }
        }
    }
}
