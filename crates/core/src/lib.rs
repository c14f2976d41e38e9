// tododb Core - Query Builders, Filters, Migration Runner & Ports
// NO database driver dependencies (adapters live in infra crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod filter;
pub mod port;
pub mod query;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
