// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    /// A single-row lookup matched nothing
    #[error("no data")]
    NoData,

    #[error("Migration error: {0}")]
    Migration(#[from] crate::application::migrate::MigrationError),
}

impl AppError {
    /// True when a lookup found no row (as opposed to a failed query)
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::NoData)
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
