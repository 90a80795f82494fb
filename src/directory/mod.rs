//! Backend data-source seam.
//!
//! The relational backend is an external collaborator; the core only needs a
//! probe per role table, one wide tenant fetch, and the transactional grade
//! replace-set. Rows cross this boundary in wire shape (snake_case) - casing
//! and denormalization happen above it.

use async_trait::async_trait;
use serde_json::Value;

use crate::model::Grade;

/// The three role tables sharing the login-code namespace, in resolution
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTable {
    Students,
    Teachers,
    Principals,
}

impl ProbeTable {
    pub fn table_name(self) -> &'static str {
        match self {
            ProbeTable::Students => "students",
            ProbeTable::Teachers => "teachers",
            ProbeTable::Principals => "principals",
        }
    }

    /// Column holding the login code in this table.
    pub fn code_field(self) -> &'static str {
        match self {
            ProbeTable::Students => "guardian_code",
            ProbeTable::Teachers => "login_code",
            ProbeTable::Principals => "login_code",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The backend refused the read. Tenant-configuration problem, not a user
    /// error; surfaces as `PolicyMissing` upstream.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("i/o error: {0}")]
    Io(String),
}

/// Read side of the backend, plus the one write this core owns.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Query one role table for rows whose code column equals `code`, across
    /// all tenants. Returns raw wire rows; each carries at least `id` and
    /// `school_id`.
    async fn probe(&self, table: ProbeTable, code: &str) -> Result<Vec<Value>, DirectoryError>;

    /// Fetch one school's full nested payload, wire shape.
    async fn fetch_tenant(&self, school_id: &str) -> Result<Value, DirectoryError>;

    /// Replace the full grade set for `(student, subject)` as a single
    /// operation. An empty `grades` still clears the subject - saving an empty
    /// sheet is a deliberate erase, not a no-op.
    async fn replace_grades(
        &self,
        school_id: &str,
        student_id: &str,
        subject: &str,
        grades: Vec<Grade>,
    ) -> Result<(), DirectoryError>;
}
