// Todo Domain Model

use serde::{Deserialize, Serialize};

/// Row identifier assigned by the store
pub type TodoId = i64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCategory {
    pub id: TodoId,
    pub name: String,
}

impl TodoCategory {
    /// Category not yet persisted (id assigned on insert)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    /// Reference to an existing category by id
    pub fn with_id(id: TodoId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

/// Todo Entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub category: TodoCategory,
    pub done: bool,
}

impl Todo {
    /// New todo in the given category (id assigned on insert)
    pub fn new(title: impl Into<String>, category_id: TodoId) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: None,
            category: TodoCategory::with_id(category_id),
            done: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
