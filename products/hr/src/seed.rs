use tracing::info;

use crate::{
    model::Employee,
    repository::{EmployeeRepository, RepositoryResult},
};

pub fn sample_employees() -> [Employee; 2] {
    [
        Employee::new("Bilbo Baggins", "burglar"),
        Employee::new("Frodo Baggins", "thief"),
    ]
}

/// Stores the sample employees, logging each one as it lands.
pub async fn preload(repository: &dyn EmployeeRepository) -> RepositoryResult<Vec<Employee>> {
    let mut saved = Vec::with_capacity(2);
    for employee in sample_employees() {
        let employee = repository.save(employee).await?;
        info!("Preloading {employee}");
        saved.push(employee);
    }
    Ok(saved)
}
