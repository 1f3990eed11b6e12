//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Create the molecule table for a configured table name.
//!
//! # Invariants
//! - The table name is the only identifier interpolated into SQL and must
//!   pass `validate_table_name`.
//! - Values never appear in SQL text; they are bound as parameters.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::ensure_molecule_table;

pub const DEFAULT_MOLECULE_TABLE: &str = "molecules";

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("table name pattern is valid")
});

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid table name `{0}`; expected letters, digits and underscores")]
    InvalidTableName(String),
}

/// Storage options for a `Database`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Name of the table holding entries. Several tables may share a file.
    pub molecule_table: String,
}

impl DatabaseConfig {
    pub fn with_table(molecule_table: impl Into<String>) -> Self {
        Self {
            molecule_table: molecule_table.into(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::with_table(DEFAULT_MOLECULE_TABLE)
    }
}

/// Rejects table names that are not plain SQL identifiers.
pub fn validate_table_name(name: &str) -> DbResult<()> {
    if TABLE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DbError::InvalidTableName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_table_name, DatabaseConfig, DbError};

    #[test]
    fn default_config_uses_molecules_table() {
        assert_eq!(DatabaseConfig::default().molecule_table, "molecules");
    }

    #[test]
    fn accepts_plain_identifiers() {
        for name in ["molecules", "_cache", "set2", "Ligands_v3"] {
            validate_table_name(name).expect("identifier should be accepted");
        }
    }

    #[test]
    fn rejects_names_that_need_quoting() {
        for name in ["", "2fast", "drop table", "a;b", "x\"y", "tab-le"] {
            let err = validate_table_name(name).expect_err("name should be rejected");
            assert!(matches!(err, DbError::InvalidTableName(ref rejected) if rejected == name));
        }
    }
}
