//! HR vertical slice.
//!
//! [`EmployeeController`] maps the five employee operations onto an
//! [`EmployeeRepository`] and shapes HAL responses ([`EntityModel`],
//! [`CollectionModel`]) carrying `self` and `employees` links.

pub mod controller;
pub mod error;
pub mod hateoas;
pub mod model;
pub mod repository;
pub mod seed;

pub use controller::{EMPLOYEES_PATH, EmployeeController, collection_model, employee_model};
pub use error::{HrError, HrResult};
pub use hateoas::{CollectionModel, EntityModel, Link, Links};
pub use model::Employee;
pub use repository::{
    DbEmployeeRepository, EmployeeRepository, InMemoryEmployeeRepository, RepositoryError,
    RepositoryResult,
};
pub use seed::{preload, sample_employees};
