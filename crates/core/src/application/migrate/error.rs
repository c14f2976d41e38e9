// Migration Errors

use crate::error::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a migration run.
///
/// Every variant carries enough context (file, statement) to diagnose
/// without re-running. Nothing is retried.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("error reading migration directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error reading {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error hashing {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The executor rejected a statement. `log` holds every statement of
    /// the file up to and including the failing one.
    #[error("error migrating {}: [{}]: {source}", path.display(), statement.trim())]
    Statement {
        file: String,
        path: PathBuf,
        statement: String,
        log: String,
        source: Box<AppError>,
    },

    #[error("error recording migration {file}: {source}")]
    Recorder { file: String, source: Box<AppError> },

    #[error("migration cancelled while applying {file}")]
    Cancelled { file: String },
}

impl MigrationError {
    /// File name the error refers to, when it concerns a single file
    pub fn file(&self) -> Option<&str> {
        match self {
            MigrationError::Statement { file, .. }
            | MigrationError::Recorder { file, .. }
            | MigrationError::Cancelled { file } => Some(file),
            _ => None,
        }
    }

    /// Result log accumulated before a statement failure
    pub fn partial_log(&self) -> Option<&str> {
        match self {
            MigrationError::Statement { log, .. } => Some(log),
            _ => None,
        }
    }
}
