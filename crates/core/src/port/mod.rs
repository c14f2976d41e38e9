// Port Layer - Interfaces for external dependencies

pub mod migration_recorder;
pub mod statement_executor;
pub mod time_provider; // For deterministic testing
pub mod todo_repository;

// Re-exports
pub use migration_recorder::MigrationRecorder;
pub use statement_executor::StatementExecutor;
pub use time_provider::TimeProvider;
pub use todo_repository::{FindResult, TodoRepository};
