// Migration Use Case - forward-only SQL script runner
//
// Files in a directory are applied in lexicographic order; each file is
// split into `;`-terminated statements, executed through an injected
// StatementExecutor and recorded through an injected MigrationRecorder.

pub mod error;
pub mod hash;
pub mod runner;
pub mod splitter;

pub use error::MigrationError;
pub use hash::{file_hash, hash_bytes};
pub use runner::{list_migration_files, MigrationFile, MigrationReport, MigrationRunner};
pub use splitter::StatementSplitter;

use serde::{Deserialize, Serialize};

/// Whether files already present in the audit trail are executed again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReapplyPolicy {
    /// Execute every file found on every run
    #[default]
    Always,
    /// Skip a file when a successful record with the same filename and hash exists
    SkipApplied,
}

impl std::fmt::Display for ReapplyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReapplyPolicy::Always => write!(f, "always"),
            ReapplyPolicy::SkipApplied => write!(f, "skip-applied"),
        }
    }
}

impl std::str::FromStr for ReapplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ReapplyPolicy::Always),
            "skip-applied" => Ok(ReapplyPolicy::SkipApplied),
            other => Err(format!("unknown reapply policy: {}", other)),
        }
    }
}
