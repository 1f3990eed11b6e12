//! Molecule table access.
//!
//! # Responsibility
//! - Own one SQLite connection plus the name of the table it manages.
//! - Scope every write in a transaction with an explicit commit flag.
//!
//! # Invariants
//! - A failed write leaves none of its own rows behind.
//! - Writes made with `commit = false` stay pending until a later call
//!   commits or `Database::commit` runs; dropping the database discards them.
//! - Absent keys are soft: reads return `None`, updates and removals skip
//!   them. Only `add_entries` fails on a key collision.

pub mod entry_repo;
pub mod property_repo;
pub mod property_table;

use crate::db::{
    ensure_molecule_table, open_db, open_db_in_memory, validate_table_name, DatabaseConfig,
    DbError,
};
use crate::model::json::JsonType;
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

pub use entry_repo::RowIter;
pub use property_table::{Inclusion, PropertyTable};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entry persistence and property queries.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("entry already exists: {0}")]
    DuplicateKey(String),
    #[error("property `{path}` of entry `{key}` is {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        path: String,
        expected: JsonType,
        actual: JsonType,
    },
    #[error("invalid persisted entry data: {0}")]
    InvalidData(String),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const WRITE_SAVEPOINT: &str = "atomlite_write";

/// A molecule table inside one SQLite database.
///
/// Single writer only: no locking beyond what SQLite provides.
pub struct Database {
    conn: Connection,
    table: String,
}

impl Database {
    /// Opens the database file at `path`, creating file and table as needed.
    pub fn open(path: impl AsRef<Path>, config: &DatabaseConfig) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?, config)
    }

    pub fn open_in_memory(config: &DatabaseConfig) -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?, config)
    }

    /// Wraps an already opened connection and ensures the table exists.
    pub fn from_connection(conn: Connection, config: &DatabaseConfig) -> RepoResult<Self> {
        validate_table_name(&config.molecule_table)?;
        ensure_molecule_table(&conn, &config.molecule_table)?;
        Ok(Self {
            conn,
            table: config.molecule_table.clone(),
        })
    }

    /// Raw connection, for ad hoc SQL against the same file.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Commits writes made with `commit = false`. No-op when none are pending.
    pub fn commit(&self) -> RepoResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT;")?;
            debug!("event=db_commit module=repo status=ok table={}", self.table);
        }
        Ok(())
    }

    /// Runs `op` as one atomic unit of work.
    ///
    /// A transaction is opened when none is active. `op` runs inside a
    /// savepoint so a failure only undoes its own statements; a transaction
    /// opened here is then rolled back entirely. On success the transaction
    /// is committed when `commit` is set and left open otherwise.
    fn write<T>(
        &self,
        event: &str,
        commit: bool,
        op: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let owns_transaction = self.conn.is_autocommit();
        if owns_transaction {
            self.conn.execute_batch("BEGIN;")?;
        }
        self.conn
            .execute_batch(&format!("SAVEPOINT {WRITE_SAVEPOINT};"))?;

        let result = op(&self.conn).and_then(|value| {
            self.conn
                .execute_batch(&format!("RELEASE {WRITE_SAVEPOINT};"))?;
            if commit {
                self.conn.execute_batch("COMMIT;")?;
            }
            Ok(value)
        });

        match result {
            Ok(value) => {
                debug!(
                    "event={event} module=repo status=ok table={} commit={commit} duration_ms={}",
                    self.table,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                self.undo_write(owns_transaction);
                error!(
                    "event={event} module=repo status=error table={} duration_ms={} error={}",
                    self.table,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn undo_write(&self, owns_transaction: bool) {
        if self.conn.is_autocommit() {
            return;
        }
        // The savepoint is gone already when RELEASE or COMMIT failed.
        let _ = self.conn.execute_batch(&format!(
            "ROLLBACK TO {WRITE_SAVEPOINT}; RELEASE {WRITE_SAVEPOINT};"
        ));
        if owns_transaction {
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
    }
}
