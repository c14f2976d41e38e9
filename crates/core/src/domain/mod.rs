// Domain Layer - Entities and audit records

pub mod migration;
pub mod todo;

// Re-exports
pub use migration::MigrationRecord;
pub use todo::{Todo, TodoCategory, TodoId};
