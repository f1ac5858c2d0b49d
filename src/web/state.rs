use crate::service::{EmployeeService, MirrorService};
use crate::storage::{EmployeeStore, MirrorStore};
use crate::sync::{MirrorSynchronizer, UpsertStrategy};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<EmployeeService>,
    pub mirror: Arc<MirrorService>,
}

impl AppState {
    pub fn new(employees: Arc<EmployeeService>, mirror: Arc<MirrorService>) -> Self {
        Self { employees, mirror }
    }

    /// Wires both services over already-opened stores.
    pub fn from_stores(
        primary: Arc<EmployeeStore>,
        secondary: Option<Arc<EmployeeStore>>,
        mirror: Arc<MirrorStore>,
        strategy: UpsertStrategy,
        auto_mirror: bool,
    ) -> Self {
        let synchronizer = Arc::new(MirrorSynchronizer::with_strategy(
            Arc::clone(&primary),
            mirror,
            strategy,
        ));

        let mut employees = EmployeeService::new(primary, Arc::clone(&synchronizer), strategy)
            .with_auto_mirror(auto_mirror);
        if let Some(secondary) = secondary {
            employees = employees.with_replica(secondary);
        }

        Self::new(
            Arc::new(employees),
            Arc::new(MirrorService::new(synchronizer, strategy)),
        )
    }
}
