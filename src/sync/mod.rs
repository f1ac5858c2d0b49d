//! Employee synchronization and upsert engine.
//!
//! Every mutating path starts with an existence check through
//! [`IdentityResolver`] and branches on its result:
//!
//! - [`UpsertCoordinator`] inserts when absent and updates when present,
//! - [`MutationService`] updates or deletes only when present,
//! - [`MirrorSynchronizer`] pushes committed state into the document mirror.
//!
//! None of these hold a lock across the check and the write. Concurrent
//! writers of the same identifier race, and the store's uniqueness
//! constraint decides the loser.

pub mod mirror;
pub mod mutation;
pub mod resolver;
pub mod upsert;

pub use mirror::MirrorSynchronizer;
pub use mutation::MutationService;
pub use resolver::IdentityResolver;
pub use upsert::{UpsertCoordinator, UpsertStrategy, WritePlan, plan_upsert};
