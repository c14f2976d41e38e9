// Migration Audit Record

use serde::{Deserialize, Serialize};

/// One applied migration file, appended to the audit table once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Assigned by the recorder on insert (0 until persisted)
    pub id: i64,
    pub filename: String,
    /// SHA-512 of the raw file bytes, lowercase hex
    pub hash: String,
    pub success: bool,
    /// Executed statement text, in order
    pub result: String,
    pub timestamp: i64, // epoch ms
}

impl MigrationRecord {
    pub fn succeeded(
        filename: impl Into<String>,
        hash: impl Into<String>,
        result: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: 0,
            filename: filename.into(),
            hash: hash.into(),
            success: true,
            result: result.into(),
            timestamp,
        }
    }
}
