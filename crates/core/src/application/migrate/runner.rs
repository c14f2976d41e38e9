// Migration Runner

use super::{file_hash, MigrationError, ReapplyPolicy, StatementSplitter};
use crate::application::shutdown::ShutdownToken;
use crate::domain::MigrationRecord;
use crate::port::{MigrationRecorder, StatementExecutor, TimeProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// A script file found in the migration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Records handed to the recorder, with their assigned ids
    pub applied: Vec<MigrationRecord>,
    /// Files skipped because they were already applied
    pub skipped: Vec<String>,
}

/// List regular files in `dir`, sorted lexicographically by file name
pub async fn list_migration_files(dir: &Path) -> Result<Vec<MigrationFile>, MigrationError> {
    let read_dir_err = |source| MigrationError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let file_type = entry.file_type().await.map_err(read_dir_err)?;
        if file_type.is_dir() {
            debug!(path = %entry.path().display(), "Skipping directory in migration path");
            continue;
        }
        files.push(MigrationFile {
            filename: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}

/// Applies a directory of SQL scripts, one statement at a time.
///
/// Files run strictly in order and statements strictly in order within a
/// file. The first failure aborts the run; files completed before it have
/// already been recorded.
pub struct MigrationRunner {
    executor: Arc<dyn StatementExecutor>,
    recorder: Arc<dyn MigrationRecorder>,
    time_provider: Arc<dyn TimeProvider>,
    policy: ReapplyPolicy,
    shutdown: Option<ShutdownToken>,
}

impl MigrationRunner {
    /// Create a runner that re-executes every file (`ReapplyPolicy::Always`)
    ///
    /// # Example
    /// ```ignore
    /// let runner = MigrationRunner::new(executor, recorder, Arc::new(SystemTimeProvider))
    ///     .with_policy(ReapplyPolicy::SkipApplied);
    /// let report = runner.run(Path::new("migrations")).await?;
    /// ```
    pub fn new(
        executor: Arc<dyn StatementExecutor>,
        recorder: Arc<dyn MigrationRecorder>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            executor,
            recorder,
            time_provider,
            policy: ReapplyPolicy::Always,
            shutdown: None,
        }
    }

    pub fn with_policy(mut self, policy: ReapplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort cleanly, before the next statement, once the token fires
    pub fn with_shutdown(mut self, token: ShutdownToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub async fn run(&self, dir: &Path) -> Result<MigrationReport, MigrationError> {
        debug!(path = %dir.display(), policy = %self.policy, "Migrate");

        let files = list_migration_files(dir).await?;
        let mut report = MigrationReport::default();

        for file in &files {
            match self.apply_file(file).await? {
                Some(record) => report.applied.push(record),
                None => report.skipped.push(file.filename.clone()),
            }
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Migrations complete"
        );
        Ok(report)
    }

    /// Returns `None` when the file was skipped as already applied
    async fn apply_file(
        &self,
        file: &MigrationFile,
    ) -> Result<Option<MigrationRecord>, MigrationError> {
        let hash = file_hash(&file.path)
            .await
            .map_err(|source| MigrationError::Hash {
                path: file.path.clone(),
                source,
            })?;

        if self.policy == ReapplyPolicy::SkipApplied
            && self
                .recorder
                .is_applied(&file.filename, &hash)
                .await
                .map_err(|e| MigrationError::Recorder {
                    file: file.filename.clone(),
                    source: Box::new(e),
                })?
        {
            info!(file = %file.filename, "Migration already applied, skipping");
            return Ok(None);
        }

        let read_err = |source| MigrationError::ReadFile {
            path: file.path.clone(),
            source,
        };
        let handle = tokio::fs::File::open(&file.path).await.map_err(read_err)?;
        let mut lines = BufReader::new(handle).lines();

        debug!(file = %file.path.display(), "Migrate");

        let mut splitter = StatementSplitter::new();
        let mut log = String::new();
        let mut statements = 0usize;

        while let Some(line) = lines.next_line().await.map_err(read_err)? {
            if let Some(statement) = splitter.push_line(&line) {
                self.execute_statement(file, &statement, &mut log).await?;
                statements += 1;
            }
        }
        if let Some(statement) = splitter.finish() {
            self.execute_statement(file, &statement, &mut log).await?;
            statements += 1;
        }
        drop(lines);

        let mut record = MigrationRecord::succeeded(
            file.filename.clone(),
            hash,
            log,
            self.time_provider.now_millis(),
        );
        record.id = self
            .recorder
            .record(&record)
            .await
            .map_err(|e| MigrationError::Recorder {
                file: file.filename.clone(),
                source: Box::new(e),
            })?;

        info!(
            file = %record.filename,
            id = record.id,
            statements,
            "Migration applied"
        );
        Ok(Some(record))
    }

    async fn execute_statement(
        &self,
        file: &MigrationFile,
        statement: &str,
        log: &mut String,
    ) -> Result<(), MigrationError> {
        if self.shutdown.as_ref().is_some_and(|t| t.is_shutdown()) {
            warn!(file = %file.filename, "Migration cancelled");
            return Err(MigrationError::Cancelled {
                file: file.filename.clone(),
            });
        }

        match self.executor.execute(statement).await {
            Ok(()) => {
                log.push_str(statement);
                log.push('\n');
                Ok(())
            }
            Err(e) => {
                log.push_str(statement);
                log.push_str(&format!("ERROR: {}\n", e));
                warn!(
                    file = %file.filename,
                    statement = %statement.trim(),
                    error = %e,
                    "Migration statement failed"
                );
                Err(MigrationError::Statement {
                    file: file.filename.clone(),
                    path: file.path.clone(),
                    statement: statement.to_string(),
                    log: log.clone(),
                    source: Box::new(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::migrate::hash_bytes;
    use crate::application::shutdown::shutdown_channel;
    use crate::port::migration_recorder::mocks::InMemoryMigrationRecorder;
    use crate::port::statement_executor::mocks::MockStatementExecutor;
    use crate::port::time_provider::FixedTimeProvider;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    const FILE_A: &str = "CREATE TABLE t(x);\n";
    const FILE_B: &str = "CREATE INDEX t_x ON t(x);\nINSERT INTO t VALUES (1);\n";

    fn migration_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn runner(
        executor: &MockStatementExecutor,
        recorder: &InMemoryMigrationRecorder,
    ) -> MigrationRunner {
        MigrationRunner::new(
            Arc::new(executor.clone()),
            Arc::new(recorder.clone()),
            Arc::new(FixedTimeProvider(1_700_000_000_000)),
        )
    }

    fn trimmed(statements: Vec<String>) -> Vec<String> {
        statements.iter().map(|s| s.trim().to_string()).collect()
    }

    #[tokio::test]
    async fn test_applies_files_then_statements_in_order() {
        // Written out of order on purpose: listing must sort by name
        let dir = migration_dir(&[("002_b.sql", FILE_B), ("001_a.sql", FILE_A)]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();

        let report = assert_ok!(runner(&executor, &recorder).run(dir.path()).await);

        assert_eq!(
            trimmed(executor.executed()),
            vec![
                "CREATE TABLE t(x);",
                "CREATE INDEX t_x ON t(x);",
                "INSERT INTO t VALUES (1);"
            ]
        );

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "001_a.sql");
        assert_eq!(records[0].hash, hash_bytes(FILE_A.as_bytes()));
        assert_eq!(records[1].filename, "002_b.sql");
        assert_eq!(records[1].hash, hash_bytes(FILE_B.as_bytes()));
        assert!(records.iter().all(|r| r.success));
        assert!(records.iter().all(|r| r.timestamp == 1_700_000_000_000));
        assert_eq!(records[0].result, "CREATE TABLE t(x);\n\n");

        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.applied[0].id, 1);
        assert_eq!(report.applied[1].id, 2);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_hash_is_stable_across_runs() {
        let dir = migration_dir(&[("001_a.sql", FILE_A), ("002_b.sql", FILE_B)]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();
        let runner = runner(&executor, &recorder);

        assert_ok!(runner.run(dir.path()).await);
        assert_ok!(runner.run(dir.path()).await);

        // Always policy: everything runs twice
        assert_eq!(executor.call_count(), 6);
        let records = recorder.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].hash, records[2].hash);
        assert_eq!(records[1].hash, records[3].hash);
    }

    #[tokio::test]
    async fn test_trailing_statement_without_terminator_runs() {
        let dir = migration_dir(&[("001_a.sql", "CREATE TABLE t(x);\nCREATE INDEX i ON t(x)")]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();

        assert_ok!(runner(&executor, &recorder).run(dir.path()).await);

        assert_eq!(
            trimmed(executor.executed()),
            vec!["CREATE TABLE t(x);", "CREATE INDEX i ON t(x)"]
        );
        assert!(recorder.records()[0].result.contains("CREATE INDEX i ON t(x)"));
    }

    #[tokio::test]
    async fn test_failure_in_second_file_keeps_first_record() {
        let dir = migration_dir(&[("001_a.sql", FILE_A), ("002_b.sql", FILE_B)]);
        // Third call overall = second statement of 002_b.sql
        let executor = MockStatementExecutor::new_fail_on_call(3, "constraint failed");
        let recorder = InMemoryMigrationRecorder::new();

        let err = assert_err!(runner(&executor, &recorder).run(dir.path()).await);

        assert_eq!(recorder.call_count(), 1);
        assert_eq!(recorder.records()[0].filename, "001_a.sql");
        assert_eq!(executor.call_count(), 3);

        let msg = err.to_string();
        assert!(msg.contains("002_b.sql"), "{}", msg);
        assert!(msg.contains("INSERT INTO t VALUES (1);"), "{}", msg);
        assert!(msg.contains("constraint failed"), "{}", msg);

        assert_eq!(err.file(), Some("002_b.sql"));
        let log = err.partial_log().unwrap();
        assert!(log.starts_with("CREATE INDEX t_x ON t(x);"));
        assert!(log.contains("INSERT INTO t VALUES (1);\nERROR: "));
    }

    #[tokio::test]
    async fn test_rejected_statement_stops_file_mid_way() {
        let dir = migration_dir(&[("001_a.sql", FILE_A), ("002_b.sql", FILE_B)]);
        let executor = MockStatementExecutor::new_fail_matching("INSERT");
        let recorder = InMemoryMigrationRecorder::new();

        let err = assert_err!(runner(&executor, &recorder).run(dir.path()).await);

        match &err {
            MigrationError::Statement {
                file, statement, ..
            } => {
                assert_eq!(file, "002_b.sql");
                assert_eq!(statement.trim(), "INSERT INTO t VALUES (1);");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("statement rejected: INSERT"));
        assert_eq!(
            trimmed(executor.executed()),
            vec![
                "CREATE TABLE t(x);",
                "CREATE INDEX t_x ON t(x);",
                "INSERT INTO t VALUES (1);"
            ]
        );
        assert_eq!(recorder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_file_fails_before_any_statement() {
        let dir = migration_dir(&[("001_a.sql", FILE_A)]);
        let bad = dir.path().join("002_b.sql");
        std::fs::write(&bad, b"INSERT INTO t VALUES ('\xff\xfe');\n").unwrap();
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();

        let err = assert_err!(runner(&executor, &recorder).run(dir.path()).await);

        assert!(matches!(err, MigrationError::ReadFile { ref path, .. } if *path == bad));
        // Only the valid first file ran and was recorded
        assert_eq!(executor.call_count(), 1);
        assert_eq!(recorder.call_count(), 1);
        assert_eq!(recorder.records()[0].filename, "001_a.sql");
    }

    #[tokio::test]
    async fn test_skip_applied_policy() {
        let dir = migration_dir(&[("001_a.sql", FILE_A), ("002_b.sql", FILE_B)]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();
        let runner = runner(&executor, &recorder).with_policy(ReapplyPolicy::SkipApplied);

        assert_ok!(runner.run(dir.path()).await);
        assert_eq!(executor.call_count(), 3);

        // Edit one file: only it is re-applied
        std::fs::write(dir.path().join("002_b.sql"), "CREATE TABLE u(y);\n").unwrap();
        let report = assert_ok!(runner.run(dir.path()).await);

        assert_eq!(report.skipped, vec!["001_a.sql".to_string()]);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].filename, "002_b.sql");
        assert_eq!(executor.call_count(), 4);
    }

    #[tokio::test]
    async fn test_recorder_failure_aborts_run() {
        let dir = migration_dir(&[("001_a.sql", FILE_A), ("002_b.sql", FILE_B)]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new_failing("disk full");

        let err = assert_err!(runner(&executor, &recorder).run(dir.path()).await);

        assert!(matches!(err, MigrationError::Recorder { ref file, .. } if file == "001_a.sql"));
        assert!(err.to_string().contains("disk full"));
        // Second file never started
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();

        let err = assert_err!(
            runner(&executor, &recorder)
                .run(&dir.path().join("missing"))
                .await
        );

        assert!(matches!(err, MigrationError::ReadDir { .. }));
        assert_eq!(executor.call_count(), 0);
        assert_eq!(recorder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_subdirectories_are_skipped() {
        let dir = migration_dir(&[("001_a.sql", FILE_A)]);
        std::fs::create_dir(dir.path().join("000_archive")).unwrap();

        let files = assert_ok!(list_migration_files(dir.path()).await);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "001_a.sql");
    }

    #[tokio::test]
    async fn test_cancelled_run_records_nothing() {
        let dir = migration_dir(&[("001_a.sql", FILE_A)]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();
        let (tx, token) = shutdown_channel();
        tx.shutdown();

        let err = assert_err!(
            runner(&executor, &recorder)
                .with_shutdown(token)
                .run(dir.path())
                .await
        );

        assert!(matches!(err, MigrationError::Cancelled { .. }));
        assert_eq!(executor.call_count(), 0);
        assert_eq!(recorder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = migration_dir(&[]);
        let executor = MockStatementExecutor::new_success();
        let recorder = InMemoryMigrationRecorder::new();

        let report = assert_ok!(runner(&executor, &recorder).run(dir.path()).await);
        assert!(report.applied.is_empty());
    }
}
