// Application Layer - Use Cases

pub mod migrate;
pub mod shutdown;

// Re-exports
pub use migrate::{MigrationError, MigrationReport, MigrationRunner, ReapplyPolicy};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
