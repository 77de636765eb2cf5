//! Persistence port for employees and its two adapters.

mod db;
mod memory;

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::model::Employee;

pub use db::DbEmployeeRepository;
pub use memory::InMemoryEmployeeRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored employee has no id")]
    MissingId,
}

/// CRUD primitives over employee records.
///
/// `save` inserts when the employee carries no id or an id the store does not
/// know; the store then assigns a fresh id. An id that is already stored is
/// updated in place. Ids are never reused.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Every stored employee, ascending by id.
    async fn find_all(&self) -> RepositoryResult<Vec<Employee>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Employee>>;

    /// Persists `employee` and returns the stored copy, id included.
    async fn save(&self, employee: Employee) -> RepositoryResult<Employee>;

    /// Removing an unknown id is not an error.
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
}
