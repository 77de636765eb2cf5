use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EmployeeRepository, RepositoryResult};
use crate::model::Employee;

#[derive(Debug, Default)]
struct Store {
    rows: BTreeMap<i64, Employee>,
    last_id: i64,
}

/// Process-local repository, used by `serve --in-memory` and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Employee>> {
        Ok(self.store.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Employee>> {
        Ok(self.store.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut employee: Employee) -> RepositoryResult<Employee> {
        let mut store = self.store.write().await;
        let id = match employee.id {
            Some(id) if store.rows.contains_key(&id) => id,
            _ => {
                store.last_id += 1;
                store.last_id
            }
        };
        employee.id = Some(id);
        store.rows.insert(id, employee.clone());
        Ok(employee)
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        self.store.write().await.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let repo = InMemoryEmployeeRepository::new();
        let bilbo = repo.save(Employee::new("Bilbo", "burglar")).await.unwrap();
        let frodo = repo.save(Employee::new("Frodo", "thief")).await.unwrap();
        assert_eq!(bilbo.id, Some(1));
        assert_eq!(frodo.id, Some(2));
        assert_eq!(repo.find_all().await.unwrap(), vec![bilbo, frodo]);
    }

    #[tokio::test]
    async fn save_with_known_id_updates_in_place() {
        let repo = InMemoryEmployeeRepository::new();
        let saved = repo.save(Employee::new("Bilbo", "burglar")).await.unwrap();
        let updated = repo
            .save(Employee::new("Bilbo", "ringbearer").with_id(1))
            .await
            .unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(repo.len().await, 1);
        assert_eq!(
            repo.find_by_id(1).await.unwrap().unwrap().role.as_deref(),
            Some("ringbearer")
        );
    }

    #[tokio::test]
    async fn save_with_unknown_id_gets_a_fresh_one() {
        let repo = InMemoryEmployeeRepository::new();
        let saved = repo
            .save(Employee::new("Sam", "gardener").with_id(999))
            .await
            .unwrap();
        assert_eq!(saved.id, Some(1));
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let repo = InMemoryEmployeeRepository::new();
        repo.save(Employee::new("Bilbo", "burglar")).await.unwrap();
        repo.delete_by_id(1).await.unwrap();
        repo.delete_by_id(1).await.unwrap();
        assert!(repo.is_empty().await);
        let next = repo.save(Employee::new("Frodo", "thief")).await.unwrap();
        assert_eq!(next.id, Some(2));
    }
}
