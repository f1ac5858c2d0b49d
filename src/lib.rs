// ============================================================================
// Employee Sync Library
// ============================================================================

pub mod config;
pub mod connection;
pub mod core;
pub mod service;
pub mod storage;
pub mod sync;
pub mod web;

// Re-export main types for convenience
pub use crate::core::{
    Employee, EmployeeChanges, EmployeeId, MirrorEmployee, MirrorId, Resolution, Result,
    StoreError, SyncError, WriteMode,
};
pub use service::{EmployeeService, MirrorService};
pub use storage::{EmployeeStore, MirrorStore, RecordStore};
pub use sync::{
    IdentityResolver, MirrorSynchronizer, MutationService, UpsertCoordinator, UpsertStrategy,
};

// Re-export wiring API
pub use config::AppConfig;
pub use connection::{StoreConfig, StoreLocation, open_employee_store, open_mirror_store};
pub use web::{AppState, build_router};
