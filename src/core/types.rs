use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier of a row in the store of record.
pub type EmployeeId = i64;

/// Identifier of a document in the mirror collection.
pub type MirrorId = String;

/// Employee row as held by the relational store of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub name: String,
    pub role: String,
}

impl Employee {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn with_id(id: EmployeeId, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            role: role.into(),
        }
    }
}

/// Employee projection kept in the document mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEmployee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MirrorId>,
    pub name: String,
    pub role: String,
}

impl MirrorEmployee {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn with_id(id: impl Into<MirrorId>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            role: role.into(),
        }
    }

    /// Projection of a relational row. The document carries the row id
    /// rendered as a string so repeated mirroring lands on the same document.
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            id: employee.id.map(|id| id.to_string()),
            name: employee.name.clone(),
            role: employee.role.clone(),
        }
    }

    /// Copy of the mutable fields only; the identity is dropped.
    pub fn detached_copy(&self) -> Self {
        Self::new(self.name.clone(), self.role.clone())
    }
}

/// Field-level mutation applied by update operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeChanges {
    pub name: String,
    pub role: String,
}

impl EmployeeChanges {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.name, &self.role)
    }
}

/// Rejects blank names and roles.
pub fn validate_fields(name: &str, role: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be blank".to_string());
    }
    if role.trim().is_empty() {
        return Err("role must not be blank".to_string());
    }
    Ok(())
}

/// Common surface of the relational row and the mirror document, so the
/// resolver, upsert and mutation components work against either store.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static;

    fn id(&self) -> Option<&Self::Id>;

    fn set_id(&mut self, id: Self::Id);

    fn name(&self) -> &str;

    fn role(&self) -> &str;

    /// Overwrites the mutable fields. The identity is left untouched.
    fn apply(&mut self, changes: &EmployeeChanges);

    fn changes(&self) -> EmployeeChanges {
        EmployeeChanges::new(self.name(), self.role())
    }
}

impl Record for Employee {
    type Id = EmployeeId;

    fn id(&self) -> Option<&EmployeeId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EmployeeId) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }

    fn apply(&mut self, changes: &EmployeeChanges) {
        self.name = changes.name.clone();
        self.role = changes.role.clone();
    }
}

impl Record for MirrorEmployee {
    type Id = MirrorId;

    fn id(&self) -> Option<&MirrorId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: MirrorId) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }

    fn apply(&mut self, changes: &EmployeeChanges) {
        self.name = changes.name.clone();
        self.role = changes.role.clone();
    }
}

/// Outcome of an existence check against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<R> {
    Found(R),
    Absent,
}

impl<R> Resolution<R> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn into_option(self) -> Option<R> {
        match self {
            Resolution::Found(record) => Some(record),
            Resolution::Absent => None,
        }
    }
}

impl<R> From<Option<R>> for Resolution<R> {
    fn from(value: Option<R>) -> Self {
        match value {
            Some(record) => Resolution::Found(record),
            None => Resolution::Absent,
        }
    }
}

/// How a store should apply a write. Computed per operation and passed
/// alongside the record; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New row; identity is assigned when the record carries none.
    Insert,
    /// Existing row; fails when the identity is unknown to the store.
    Update,
    /// Store-native atomic insert-or-update keyed by the record identity.
    Upsert,
}

impl Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WriteMode::Insert => "insert",
            WriteMode::Update => "update",
            WriteMode::Upsert => "upsert",
        };
        f.write_str(name)
    }
}
