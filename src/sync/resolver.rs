use crate::core::{Resolution, Result};
use crate::storage::RecordStore;
use std::sync::Arc;
use tracing::debug;

/// Answers "does this identifier currently exist" against one store.
///
/// Absence is a normal result, never an error; only store failures propagate.
pub struct IdentityResolver<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for IdentityResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore + ?Sized> IdentityResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// A missing identifier resolves as absent without touching the store.
    pub async fn resolve(&self, id: Option<&S::Id>) -> Result<Resolution<S::Record>> {
        let Some(id) = id else {
            debug!(backend = self.store.backend(), "no identifier supplied, resolved as absent");
            return Ok(Resolution::Absent);
        };

        let found = self.store.find_by_id(id).await?;
        debug!(
            backend = self.store.backend(),
            %id,
            found = found.is_some(),
            "identity resolved"
        );
        Ok(found.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Employee;
    use crate::storage::{EmployeeStore, InMemoryEmployeeStore};

    fn resolver(records: Vec<Employee>) -> IdentityResolver<EmployeeStore> {
        let store: Arc<EmployeeStore> = Arc::new(InMemoryEmployeeStore::with_records(records));
        IdentityResolver::new(store)
    }

    #[tokio::test]
    async fn present_id_is_found() {
        let resolver = resolver(vec![Employee::with_id(1, "Alice", "Developer")]);
        let resolution = resolver.resolve(Some(&1)).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Found(Employee::with_id(1, "Alice", "Developer"))
        );
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let resolver = resolver(vec![Employee::with_id(1, "Alice", "Developer")]);
        assert_eq!(resolver.resolve(Some(&2)).await.unwrap(), Resolution::Absent);
    }

    #[tokio::test]
    async fn missing_id_is_absent() {
        let resolver = resolver(vec![Employee::with_id(1, "Alice", "Developer")]);
        assert_eq!(resolver.resolve(None).await.unwrap(), Resolution::Absent);
    }
}
