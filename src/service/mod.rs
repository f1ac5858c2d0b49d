//! Facades over the sync engine used by the HTTP layer and the CLI.

pub mod employee;
pub mod mirror;

pub use employee::EmployeeService;
pub use mirror::MirrorService;
