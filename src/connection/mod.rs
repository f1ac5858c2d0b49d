//! Opening stores from connection settings.

pub mod config;

pub use config::{StoreConfig, StoreLocation};

use crate::core::{StoreError, StoreResult};
use crate::storage::{
    EmployeeStore, InMemoryEmployeeStore, InMemoryMirrorStore, JsonFileMirrorStore, MirrorStore,
    PgEmployeeStore, RecordStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// Opens a relational employee store and makes sure its table exists.
pub async fn open_employee_store(config: &StoreConfig) -> StoreResult<Arc<EmployeeStore>> {
    config.validate().map_err(StoreError::Unsupported)?;

    let store: Arc<EmployeeStore> = match &config.location {
        StoreLocation::Memory => Arc::new(InMemoryEmployeeStore::new()),
        StoreLocation::Postgres(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.connect_timeout)
                .connect(url)
                .await?;
            Arc::new(PgEmployeeStore::new(pool))
        }
        StoreLocation::JsonFile(_) => {
            return Err(StoreError::Unsupported(format!(
                "{} cannot hold relational employee records",
                config.location
            )));
        }
    };

    store.init().await?;
    info!(location = %config.location, backend = store.backend(), "employee store ready");
    Ok(store)
}

/// Opens a document mirror store.
pub async fn open_mirror_store(config: &StoreConfig) -> StoreResult<Arc<MirrorStore>> {
    config.validate().map_err(StoreError::Unsupported)?;

    let store: Arc<MirrorStore> = match &config.location {
        StoreLocation::Memory => Arc::new(InMemoryMirrorStore::new()),
        StoreLocation::JsonFile(path) => Arc::new(JsonFileMirrorStore::open(path)?),
        StoreLocation::Postgres(_) => {
            return Err(StoreError::Unsupported(format!(
                "{} cannot hold mirror documents",
                config.location
            )));
        }
    };

    store.init().await?;
    info!(location = %config.location, backend = store.backend(), "mirror store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Employee, MirrorEmployee, WriteMode};

    #[tokio::test]
    async fn memory_locations_open_empty_stores() {
        let employees = open_employee_store(&StoreConfig::memory()).await.unwrap();
        let mirror = open_mirror_store(&StoreConfig::memory()).await.unwrap();

        assert_eq!(employees.backend(), "memory");
        assert_eq!(employees.count().await.unwrap(), 0);
        assert_eq!(mirror.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn file_location_reopens_written_documents() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(StoreLocation::JsonFile(dir.path().join("mirror.json")));

        let mirror = open_mirror_store(&config).await.unwrap();
        mirror
            .write(MirrorEmployee::with_id("100", "Santiago", "Developer"), WriteMode::Insert)
            .await
            .unwrap();
        drop(mirror);

        let reopened = open_mirror_store(&config).await.unwrap();
        assert_eq!(reopened.backend(), "json_file");
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mismatched_backends_are_rejected() {
        let file = StoreConfig::new(StoreLocation::JsonFile("employees.json".into()));
        assert!(matches!(
            open_employee_store(&file).await,
            Err(StoreError::Unsupported(_))
        ));

        let pg = StoreConfig::from_url("postgres://localhost/hr").unwrap();
        assert!(matches!(
            open_mirror_store(&pg).await,
            Err(StoreError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn invalid_settings_fail_before_connecting() {
        let config = StoreConfig::memory().max_connections(0);
        let err = open_employee_store(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::Unsupported(_)));

        let err = open_mirror_store(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::Unsupported(_)));

        let dir = tempfile::tempdir().unwrap();
        let file = StoreConfig::new(StoreLocation::JsonFile(dir.path().join("mirror.json")))
            .connect_timeout(std::time::Duration::ZERO);
        assert!(matches!(
            open_mirror_store(&file).await,
            Err(StoreError::Unsupported(_))
        ));
        assert!(!dir.path().join("mirror.json").exists());

        // memory store still usable with valid settings
        let store = open_employee_store(&StoreConfig::memory()).await.unwrap();
        store
            .write(Employee::new("Alice", "Developer"), WriteMode::Insert)
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
