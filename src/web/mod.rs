//! HTTP surface over the employee and mirror services.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::build_router;
pub use state::AppState;
