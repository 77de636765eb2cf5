use async_trait::async_trait;
use entity::employees;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::{EmployeeRepository, RepositoryResult};
use crate::model::Employee;

/// sea-orm backed repository over the `employees` table.
#[derive(Debug, Clone)]
pub struct DbEmployeeRepository {
    db: DatabaseConnection,
}

impl DbEmployeeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for DbEmployeeRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Employee>> {
        let row = employees::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Employee::from))
    }

    async fn save(&self, employee: Employee) -> RepositoryResult<Employee> {
        let existing = match employee.id {
            Some(id) => employees::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        let stored = match existing {
            Some(row) => {
                let mut active: employees::ActiveModel = row.into();
                active.name = Set(employee.name);
                active.role = Set(employee.role);
                active.update(&self.db).await?
            }
            None => {
                employees::ActiveModel {
                    name: Set(employee.name),
                    role: Set(employee.role),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };
        Ok(stored.into())
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        employees::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
