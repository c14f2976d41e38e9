// Positional argument binding for QueryFragment parameters

use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;
use tododb_core::error::{AppError, Result};
use tododb_core::query::SqlValue;

/// Bind fragment parameters, in order, as SQLite arguments
pub fn to_arguments<'q>(params: &[SqlValue]) -> Result<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for param in params {
        let bound = match param {
            SqlValue::Null => args.add(None::<String>),
            SqlValue::Bool(v) => args.add(*v),
            SqlValue::Int(v) => args.add(*v),
            SqlValue::Text(v) => args.add(v.clone()),
        };
        bound.map_err(|e| AppError::Database(format!("failed to bind {}: {}", param, e)))?;
    }
    Ok(args)
}
