//! Path configuration: database location and migration directory

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tododb_infra_sqlite::BUNDLED_MIGRATIONS_DIR;

pub const DEFAULT_DB_PATH: &str = "~/.tododb/todo.db";

/// sqlx connection URL for a database path (URLs pass through)
pub fn database_url(db_path: &str) -> String {
    if db_path.starts_with("sqlite:") {
        return db_path.to_string();
    }
    let expanded = shellexpand::tilde(db_path);
    format!("sqlite://{}", expanded)
}

/// Create the parent directory of a file database path
pub fn ensure_db_dir(db_path: &str) -> Result<()> {
    if db_path.starts_with("sqlite:") {
        return Ok(());
    }
    let expanded = shellexpand::tilde(db_path);
    if let Some(parent) = Path::new(expanded.as_ref()).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Resolve the migration directory.
///
/// - empty: scripts bundled with the SQLite adapter
/// - relative: resolved against the executable's directory
/// - absolute: lexically cleaned
pub fn resolve_migration_dir(raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Ok(PathBuf::from(BUNDLED_MIGRATIONS_DIR));
    }

    let expanded = shellexpand::tilde(raw);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        return Ok(clean(path));
    }

    let exe = std::env::current_exe().context("cannot locate executable")?;
    let base = exe.parent().unwrap_or_else(|| Path::new("/"));
    Ok(clean(&base.join(path)))
}

/// Lexical cleanup: drops `.` and folds `..` (no filesystem access)
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
