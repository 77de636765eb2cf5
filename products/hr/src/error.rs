use platform_api::ApiError;
use thiserror::Error;

use crate::repository::RepositoryError;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("Employee with ID {0} not found")]
    EmployeeNotFound(i64),
    /// Storage failures pass through untouched.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::EmployeeNotFound(_) => ApiError::NotFound(err.to_string()),
            HrError::Repository(inner) => ApiError::internal(anyhow::Error::new(inner)),
        }
    }
}
