use thiserror::Error;

/// Failures raised by a store backend. From the engine's point of view all
/// of these are infrastructure failures; only `DuplicateKey` is reinterpreted
/// when it happens on the insert branch of an upsert.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("Record '{0}' not found in store")]
    Missing(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return Self::DuplicateKey(db_err.message().to_string());
            }
        }
        Self::Backend(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Backend(format!("migration failed: {err}"))
    }
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

/// Errors surfaced by the synchronization engine to its callers.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Employee '{0}' not found")]
    NotFound(String),

    #[error("Employee '{0}' was created concurrently")]
    ConflictOnCreate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Infrastructure failure: {0}")]
    Infrastructure(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
