// SQLite TodoRepository Implementation

use crate::{map_sqlx_error, to_arguments};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tododb_core::domain::{Todo, TodoCategory, TodoId};
use tododb_core::error::{AppError, Result};
use tododb_core::filter::{Filter, IntFilter, SetMembership};
use tododb_core::port::{FindResult, TodoRepository};
use tododb_core::query::QueryFragment;
use tracing::debug;

const SELECT_TODO: &str = "SELECT t.id, t.title, t.description, c.id AS category_id, \
     c.name AS category_name, t.done \
     FROM todo t JOIN todo_category c ON t.category_id = c.id";

const COUNT_TODO: &str = "SELECT COUNT(t.id) FROM todo t JOIN todo_category c ON t.category_id = c.id";

pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create_categories(&self, categories: &[TodoCategory]) -> Result<Vec<TodoId>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut ids = Vec::with_capacity(categories.len());

        for category in categories {
            let result = sqlx::query("INSERT INTO todo_category (name) VALUES (?)")
                .bind(&category.name)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(ids)
    }

    async fn create(&self, todos: &[Todo]) -> Result<Vec<TodoId>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut ids = Vec::with_capacity(todos.len());

        for todo in todos {
            let result = sqlx::query(
                "INSERT INTO todo (title, description, category_id, done) VALUES (?, ?, ?, ?)",
            )
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.category.id)
            .bind(todo.done)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(ids)
    }

    async fn update(&self, todos: &[Todo]) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut affected = 0;

        for todo in todos {
            let result = sqlx::query(
                r#"
                UPDATE todo
                SET title = ?, description = ?, category_id = ?, done = ?
                WHERE id = ?
                "#,
            )
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.category.id)
            .bind(todo.done)
            .bind(todo.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            affected += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(affected)
    }

    async fn delete(&self, ids: &[TodoId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut id_filter = IntFilter::new("id");
        id_filter.is_in(ids.iter().copied());

        let mut query = QueryFragment::joined("DELETE FROM todo WHERE ", "");
        id_filter.generate(&mut query);
        let (sql, params) = query.into_parts();

        let result = sqlx::query_with(&sql, to_arguments(&params)?)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: TodoId) -> Result<Todo> {
        let sql = format!("{} WHERE t.id = ?", SELECT_TODO);
        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TodoRow::into_todo).ok_or(AppError::NoData)
    }

    async fn find(
        &self,
        filter: Option<&dyn Filter>,
        offset: i64,
        limit: i64,
    ) -> Result<FindResult> {
        let mut where_clause = QueryFragment::where_clause();
        if let Some(filter) = filter {
            filter.generate(&mut where_clause);
        }

        let mut count = QueryFragment::new();
        count.add_text(COUNT_TODO);
        count.add_fragment(&where_clause);
        let (count_sql, count_params) = count.into_parts();

        let mut select = QueryFragment::new();
        select.add_text(SELECT_TODO);
        select.add_fragment(&where_clause);
        select.add_text_with_params(" ORDER BY t.id LIMIT ? OFFSET ?", [limit, offset]);
        let (select_sql, select_params) = select.into_parts();

        debug!(sql = %select_sql, params = select_params.len(), "TodoRepository.find");

        let total: i64 = sqlx::query_scalar_with(&count_sql, to_arguments(&count_params)?)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let rows: Vec<TodoRow> = sqlx::query_as_with(&select_sql, to_arguments(&select_params)?)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok((total, rows.into_iter().map(TodoRow::into_todo).collect()))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    category_id: i64,
    category_name: String,
    done: bool,
}

impl TodoRow {
    fn into_todo(self) -> Todo {
        Todo {
            id: self.id,
            title: self.title,
            description: self.description,
            category: TodoCategory {
                id: self.category_id,
                name: self.category_name,
            },
            done: self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, BUNDLED_MIGRATIONS_DIR};
    use std::path::Path;
    use tododb_core::application::migrate::ReapplyPolicy;
    use tododb_core::filter::{Comparable, PatternMatch, TodoFilter};
    use tokio_test::{assert_err, assert_ok};

    async fn setup_test_db() -> SqliteTodoRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool, Path::new(BUNDLED_MIGRATIONS_DIR), ReapplyPolicy::Always)
            .await
            .unwrap();
        SqliteTodoRepository::new(pool)
    }

    async fn seed(repo: &SqliteTodoRepository) {
        repo.create_categories(&[
            TodoCategory::named("category 1"),
            TodoCategory::named("category 2"),
        ])
        .await
        .unwrap();
        repo.create(&[
            Todo::new("todo 1", 1),
            Todo::new("todo 2", 1).with_description("desc 2"),
            Todo::new("todo 3", 2),
        ])
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_test_db().await;
        let ids = repo
            .create_categories(&[TodoCategory::named("category 1")])
            .await
            .unwrap();
        assert_eq!(ids, vec![1]);

        let ids = repo.create(&[Todo::new("todo 1", 1)]).await.unwrap();
        assert_eq!(ids, vec![1]);

        let todo = repo.get(1).await.unwrap();
        assert_eq!(
            todo,
            Todo {
                id: 1,
                title: "todo 1".to_string(),
                description: None,
                category: TodoCategory {
                    id: 1,
                    name: "category 1".to_string()
                },
                done: false,
            }
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_no_data() {
        let repo = setup_test_db().await;
        let err = assert_err!(repo.get(42).await);
        assert!(err.is_no_data());
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_fails() {
        let repo = setup_test_db().await;
        let err = assert_err!(repo.create(&[Todo::new("orphan", 99)]).await);
        assert!(err.to_string().to_lowercase().contains("foreign key"), "{}", err);
    }

    #[tokio::test]
    async fn test_find_without_filter() {
        let repo = setup_test_db().await;
        seed(&repo).await;

        let (total, todos) = repo.find(None, 0, 10).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            todos.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(todos[1].description.as_deref(), Some("desc 2"));

        // Empty filter behaves like no filter
        let filter = TodoFilter::new();
        let (total, _) = repo.find(Some(&filter), 0, 10).await.unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_find_with_filter() {
        let repo = setup_test_db().await;
        seed(&repo).await;

        let mut filter = TodoFilter::new();
        filter.category().equal("category 1");
        filter.title().like("%2");

        let (total, todos) = repo.find(Some(&filter), 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(todos[0].title, "todo 2");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test_db().await;
        seed(&repo).await;

        let mut todo = repo.get(3).await.unwrap();
        todo.title = "todo tiga".to_string();
        todo.description = Some("desc 3".to_string());
        todo.category = TodoCategory::with_id(1);
        todo.done = true;
        assert_eq!(assert_ok!(repo.update(&[todo]).await), 1);

        let updated = repo.get(3).await.unwrap();
        assert_eq!(updated.title, "todo tiga");
        assert_eq!(updated.category.name, "category 1");
        assert!(updated.done);

        assert_eq!(repo.delete(&[1, 3, 99]).await.unwrap(), 2);
        assert_eq!(repo.delete(&[]).await.unwrap(), 0);
        let (total, todos) = repo.find(None, 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(todos[0].id, 2);
    }
}
