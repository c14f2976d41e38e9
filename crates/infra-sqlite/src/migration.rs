// SQLite Migration Adapters
// StatementExecutor + MigrationRecorder over the `_migration` audit table

use crate::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tododb_core::application::migrate::{MigrationReport, MigrationRunner, ReapplyPolicy};
use tododb_core::domain::MigrationRecord;
use tododb_core::error::Result;
use tododb_core::port::time_provider::SystemTimeProvider;
use tododb_core::port::{MigrationRecorder, StatementExecutor};
use tracing::{debug, info};

/// Schema scripts shipped with this crate
pub const BUNDLED_MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

const CREATE_MIGRATION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migration (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        filename  TEXT NOT NULL,
        hash      TEXT NOT NULL,
        success   BOOLEAN NOT NULL,
        result    TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )
"#;

/// Executes each migration statement directly on the pool
pub struct SqliteStatementExecutor {
    pool: SqlitePool,
}

impl SqliteStatementExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatementExecutor for SqliteStatementExecutor {
    async fn execute(&self, statement: &str) -> Result<()> {
        debug!(statement = %statement.trim(), "Executing migration statement");
        sqlx::raw_sql(statement)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Appends one `_migration` row per applied file
pub struct SqliteMigrationRecorder {
    pool: SqlitePool,
}

impl SqliteMigrationRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the audit table if missing
    pub async fn ensure_table(&self) -> Result<()> {
        sqlx::query(CREATE_MIGRATION_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// All audit rows, oldest first
    pub async fn history(&self) -> Result<Vec<MigrationRecord>> {
        let rows: Vec<MigrationRow> = sqlx::query_as(
            "SELECT id, filename, hash, success, result, timestamp FROM _migration ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MigrationRow::into_record).collect())
    }
}

#[async_trait]
impl MigrationRecorder for SqliteMigrationRecorder {
    async fn record(&self, record: &MigrationRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO _migration (filename, hash, success, result, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.filename)
        .bind(&record.hash)
        .bind(record.success)
        .bind(&record.result)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn is_applied(&self, filename: &str, hash: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM _migration WHERE filename = ? AND hash = ? AND success = 1",
        )
        .bind(filename)
        .bind(hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MigrationRow {
    id: i64,
    filename: String,
    hash: String,
    success: bool,
    result: String,
    timestamp: i64,
}

impl MigrationRow {
    fn into_record(self) -> MigrationRecord {
        MigrationRecord {
            id: self.id,
            filename: self.filename,
            hash: self.hash,
            success: self.success,
            result: self.result,
            timestamp: self.timestamp,
        }
    }
}

/// Run database migrations from `dir` against `pool`
pub async fn run_migrations(
    pool: &SqlitePool,
    dir: &Path,
    policy: ReapplyPolicy,
) -> Result<MigrationReport> {
    info!(path = %dir.display(), %policy, "Running database migrations...");

    let recorder = Arc::new(SqliteMigrationRecorder::new(pool.clone()));
    recorder.ensure_table().await?;

    let runner = MigrationRunner::new(
        Arc::new(SqliteStatementExecutor::new(pool.clone())),
        recorder,
        Arc::new(SystemTimeProvider),
    )
    .with_policy(policy);

    Ok(runner.run(dir).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use tododb_core::application::migrate::{hash_bytes, MigrationError};
    use tododb_core::error::AppError;
    use tokio_test::{assert_err, assert_ok};

    async fn table_count(pool: &SqlitePool, name: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_bundled_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let report = assert_ok!(
            run_migrations(&pool, Path::new(BUNDLED_MIGRATIONS_DIR), ReapplyPolicy::Always).await
        );

        assert_eq!(report.applied.len(), 2);
        assert_eq!(table_count(&pool, "todo_category").await, 1);
        assert_eq!(table_count(&pool, "todo").await, 1);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todo")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_records_audit_rows() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let script = "CREATE TABLE t (x INTEGER);\nINSERT INTO t VALUES (1);\n";
        std::fs::write(dir.path().join("001_t.sql"), script).unwrap();

        run_migrations(&pool, dir.path(), ReapplyPolicy::Always)
            .await
            .unwrap();

        let history = SqliteMigrationRecorder::new(pool.clone())
            .history()
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, 1);
        assert_eq!(history[0].filename, "001_t.sql");
        assert_eq!(history[0].hash, hash_bytes(script.as_bytes()));
        assert!(history[0].success);
        assert!(history[0].result.contains("INSERT INTO t VALUES (1);"));
        assert!(history[0].timestamp > 0);
    }

    #[tokio::test]
    async fn test_skip_applied_uses_audit_table() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        // Not idempotent: a second execution would fail
        std::fs::write(dir.path().join("001_t.sql"), "CREATE TABLE t (x INTEGER);\n").unwrap();

        run_migrations(&pool, dir.path(), ReapplyPolicy::SkipApplied)
            .await
            .unwrap();
        let report = run_migrations(&pool, dir.path(), ReapplyPolicy::SkipApplied)
            .await
            .unwrap();
        assert_eq!(report.skipped, vec!["001_t.sql".to_string()]);

        let err = assert_err!(run_migrations(&pool, dir.path(), ReapplyPolicy::Always).await);
        match err {
            AppError::Migration(MigrationError::Statement { file, statement, .. }) => {
                assert_eq!(file, "001_t.sql");
                assert!(statement.contains("CREATE TABLE t"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
