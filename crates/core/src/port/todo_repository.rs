// Todo Repository Port (Interface)

use crate::domain::{Todo, TodoCategory, TodoId};
use crate::error::Result;
use crate::filter::Filter;
use async_trait::async_trait;

/// `(total matching rows ignoring paging, requested page)`
pub type FindResult = (i64, Vec<Todo>);

/// Repository interface for Todo persistence
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert categories, returning their new ids in input order
    async fn create_categories(&self, categories: &[TodoCategory]) -> Result<Vec<TodoId>>;

    /// Insert todos (single transaction), returning new ids in input order
    async fn create(&self, todos: &[Todo]) -> Result<Vec<TodoId>>;

    /// Update todos by id (single transaction); returns rows affected
    async fn update(&self, todos: &[Todo]) -> Result<u64>;

    /// Delete todos by id; returns rows affected
    async fn delete(&self, ids: &[TodoId]) -> Result<u64>;

    /// Fetch one todo; `AppError::NoData` when the id matches nothing
    async fn get(&self, id: TodoId) -> Result<Todo>;

    /// Page through todos ordered by id.
    ///
    /// `None`, or a filter that generates no SQL, means no WHERE clause.
    async fn find(
        &self,
        filter: Option<&dyn Filter>,
        offset: i64,
        limit: i64,
    ) -> Result<FindResult>;
}
