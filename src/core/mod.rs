pub mod error;
pub mod types;

pub use error::{Result, StoreError, StoreResult, SyncError};
pub use types::{
    Employee, EmployeeChanges, EmployeeId, MirrorEmployee, MirrorId, Record, Resolution,
    WriteMode, validate_fields,
};
