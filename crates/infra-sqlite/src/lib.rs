// tododb Infrastructure - SQLite Adapter
// Implements: StatementExecutor, MigrationRecorder, TodoRepository

mod arguments;
mod connection;
mod error;
mod migration;
mod todo_repository;

pub use arguments::to_arguments;
pub use connection::create_pool;
pub use error::map_sqlx_error;
pub use migration::{
    run_migrations, SqliteMigrationRecorder, SqliteStatementExecutor, BUNDLED_MIGRATIONS_DIR,
};
pub use todo_repository::SqliteTodoRepository;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
