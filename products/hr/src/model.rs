use std::fmt;

use serde::{Deserialize, Serialize};

/// An employee record. `id` is assigned by the repository on first save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl Employee {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            role: Some(role.into()),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Employee{{id=")?;
        match self.id {
            Some(id) => write!(f, "{id}")?,
            None => f.write_str("null")?,
        }
        write!(
            f,
            ", name='{}', role='{}'}}",
            self.name.as_deref().unwrap_or("null"),
            self.role.as_deref().unwrap_or("null")
        )
    }
}

impl From<entity::employees::Model> for Employee {
    fn from(model: entity::employees::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            role: model.role,
        }
    }
}
