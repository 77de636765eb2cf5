use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    error::{HrError, HrResult},
    hateoas::{CollectionModel, EntityModel, Link, Links},
    model::Employee,
    repository::{EmployeeRepository, RepositoryError},
};

/// Collection address; single employees live below it.
pub const EMPLOYEES_PATH: &str = "/employees";
pub const EMPLOYEES_REL: &str = "employees";

pub fn employee_href(id: i64) -> String {
    format!("{EMPLOYEES_PATH}/{id}")
}

/// Wraps an employee with its `self` and `employees` links.
pub fn employee_model(employee: Employee, id: i64) -> EntityModel<Employee> {
    let links = Links::new()
        .with(Link::self_link(employee_href(id)))
        .with(Link::new(EMPLOYEES_REL, EMPLOYEES_PATH));
    EntityModel::of(employee, links)
}

pub fn collection_model(employees: Vec<EntityModel<Employee>>) -> CollectionModel {
    CollectionModel::of(employees, Links::new().with(Link::self_link(EMPLOYEES_PATH)))
}

/// Stateless façade over an [`EmployeeRepository`].
#[derive(Clone)]
pub struct EmployeeController {
    repository: Arc<dyn EmployeeRepository>,
}

impl EmployeeController {
    pub fn new(repository: Arc<dyn EmployeeRepository>) -> Self {
        Self { repository }
    }

    #[instrument(name = "employees.all", skip_all)]
    pub async fn all(&self) -> HrResult<CollectionModel> {
        let employees = self
            .repository
            .find_all()
            .await?
            .into_iter()
            .map(|employee| -> HrResult<_> {
                let id = employee.id.ok_or(RepositoryError::MissingId)?;
                Ok(employee_model(employee, id))
            })
            .collect::<HrResult<Vec<_>>>()?;
        debug!(count = employees.len(), "listed employees");
        Ok(collection_model(employees))
    }

    #[instrument(name = "employees.one", skip(self))]
    pub async fn one(&self, id: i64) -> HrResult<EntityModel<Employee>> {
        let employee = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(HrError::EmployeeNotFound(id))?;
        Ok(employee_model(employee, id))
    }

    /// Persists a new employee; an id supplied by the caller is ignored.
    #[instrument(name = "employees.create", skip_all)]
    pub async fn new_employee(&self, mut employee: Employee) -> HrResult<Employee> {
        employee.id = None;
        Ok(self.repository.save(employee).await?)
    }

    /// Replaces name and role of employee `id`, or stores `new_employee` as a
    /// brand-new record when `id` is unknown. Absent fields overwrite.
    #[instrument(name = "employees.update", skip(self, new_employee))]
    pub async fn update_existing_employee(
        &self,
        new_employee: Employee,
        id: i64,
    ) -> HrResult<Employee> {
        match self.repository.find_by_id(id).await? {
            Some(mut employee) => {
                employee.name = new_employee.name;
                employee.role = new_employee.role;
                Ok(self.repository.save(employee).await?)
            }
            None => {
                debug!("employee missing, inserting as new record");
                self.new_employee(new_employee).await
            }
        }
    }

    #[instrument(name = "employees.delete", skip(self))]
    pub async fn delete_employee(&self, id: i64) -> HrResult<()> {
        Ok(self.repository.delete_by_id(id).await?)
    }
}
