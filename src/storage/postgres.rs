use super::RecordStore;
use crate::core::{Employee, EmployeeId, StoreError, StoreResult, WriteMode};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// `employees(id BIGSERIAL PRIMARY KEY, name, role)` on PostgreSQL.
///
/// The primary key is the uniqueness constraint that turns the upsert race
/// into a loud `DuplicateKey` instead of a second row.
#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Explicit ids bypass the sequence, so move it past them. The sequence
    /// only ever moves forward; ids it already handed out are never reissued.
    async fn bump_sequence(&self, id: EmployeeId) -> StoreResult<()> {
        sqlx::query(
            r#"
            SELECT setval(pg_get_serial_sequence('employees', 'id'), $1)
            FROM employees_id_seq
            WHERE last_value < $1 OR (NOT is_called AND last_value <= $1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgEmployeeStore {
    type Id = EmployeeId;
    type Record = Employee;

    async fn init(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &EmployeeId) -> StoreResult<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT id, name, role FROM employees WHERE id = $1")
                .bind(*id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(employee)
    }

    async fn find_all(&self) -> StoreResult<Vec<Employee>> {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT id, name, role FROM employees ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }

    async fn write(&self, record: Employee, mode: WriteMode) -> StoreResult<Employee> {
        match (mode, record.id) {
            (WriteMode::Insert, None) => {
                let employee = sqlx::query_as::<_, Employee>(
                    "INSERT INTO employees (name, role) VALUES ($1, $2) RETURNING id, name, role",
                )
                .bind(&record.name)
                .bind(&record.role)
                .fetch_one(&self.pool)
                .await?;
                Ok(employee)
            }
            (WriteMode::Insert, Some(id)) => {
                let employee = sqlx::query_as::<_, Employee>(
                    "INSERT INTO employees (id, name, role) VALUES ($1, $2, $3) RETURNING id, name, role",
                )
                .bind(id)
                .bind(&record.name)
                .bind(&record.role)
                .fetch_one(&self.pool)
                .await?;
                self.bump_sequence(id).await?;
                Ok(employee)
            }
            (WriteMode::Update, None) => Err(StoreError::Missing("<none>".to_string())),
            (WriteMode::Update, Some(id)) => {
                let employee = sqlx::query_as::<_, Employee>(
                    "UPDATE employees SET name = $1, role = $2 WHERE id = $3 RETURNING id, name, role",
                )
                .bind(&record.name)
                .bind(&record.role)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                employee.ok_or_else(|| StoreError::Missing(id.to_string()))
            }
            (WriteMode::Upsert, None) => Err(StoreError::Unsupported(
                "upsert requires an identifier".to_string(),
            )),
            (WriteMode::Upsert, Some(id)) => {
                let employee = sqlx::query_as::<_, Employee>(
                    r#"
                    INSERT INTO employees (id, name, role)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (id) DO UPDATE
                    SET name = EXCLUDED.name, role = EXCLUDED.role
                    RETURNING id, name, role
                    "#,
                )
                .bind(id)
                .bind(&record.name)
                .bind(&record.role)
                .fetch_one(&self.pool)
                .await?;
                self.bump_sequence(id).await?;
                Ok(employee)
            }
        }
    }

    async fn delete_by_id(&self, id: &EmployeeId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(*id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
