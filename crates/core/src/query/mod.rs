// Query Layer - Parameterized SQL fragments

pub mod fragment;
pub mod value;

// Re-exports
pub use fragment::QueryFragment;
pub use value::SqlValue;

/// Positional placeholder marker used in emitted SQL
pub const PLACEHOLDER: char = '?';

/// Count placeholder markers in a SQL string
pub fn count_placeholders(sql: &str) -> usize {
    sql.chars().filter(|c| *c == PLACEHOLDER).count()
}
