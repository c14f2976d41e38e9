// Migration Recorder Port
// Persists the audit trail of applied migration files

use crate::domain::MigrationRecord;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MigrationRecorder: Send + Sync {
    /// Append one record; returns the identifier assigned by the store
    async fn record(&self, record: &MigrationRecord) -> Result<i64>;

    /// Whether a successful record exists for this filename and hash.
    ///
    /// Only consulted when the runner skips already-applied files.
    async fn is_applied(&self, _filename: &str, _hash: &str) -> Result<bool> {
        Ok(false)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Keeps records in memory, assigning sequential ids from 1
    #[derive(Clone, Default)]
    pub struct InMemoryMigrationRecorder {
        records: Arc<Mutex<Vec<MigrationRecord>>>,
        fail_with: Option<String>,
    }

    impl InMemoryMigrationRecorder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Recorder whose every `record` call fails
        pub fn new_failing(message: impl Into<String>) -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
                fail_with: Some(message.into()),
            }
        }

        pub fn records(&self) -> Vec<MigrationRecord> {
            self.records.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MigrationRecorder for InMemoryMigrationRecorder {
        async fn record(&self, record: &MigrationRecord) -> Result<i64> {
            if let Some(msg) = &self.fail_with {
                return Err(AppError::Database(msg.clone()));
            }
            let mut records = self.records.lock().unwrap();
            let id = records.len() as i64 + 1;
            let mut stored = record.clone();
            stored.id = id;
            records.push(stored);
            Ok(id)
        }

        async fn is_applied(&self, filename: &str, hash: &str) -> Result<bool> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.success && r.filename == filename && r.hash == hash))
        }
    }
}
