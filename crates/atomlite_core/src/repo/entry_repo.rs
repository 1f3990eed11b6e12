//! Entry lifecycle over the molecule table.
//!
//! # Responsibility
//! - Add, update, upsert and remove entries in bulk.
//! - Look entries up by key, test existence, count and iterate them.
//!
//! # Invariants
//! - Entry reads (`get_entry`, `has_entry`, ...) only see rows with a
//!   molecule; property reads see every row.
//! - Bulk writes reuse one prepared statement inside one transaction.
//! - Iteration follows rowid (storage) order, also when filtering by keys.

use super::{Database, RepoError, RepoResult};
use crate::codec::Molecule;
use crate::model::entry::{Entry, Properties, PropertyEntry};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::VecDeque;

const PAGE_SIZE: i64 = 512;

impl Database {
    /// Inserts new entries.
    ///
    /// Fails with `DuplicateKey` when a key is already stored, including as a
    /// property placeholder. The batch is all-or-nothing.
    pub fn add_entries<'a, I>(&self, entries: I, commit: bool) -> RepoResult<()>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let sql = format!(
            "INSERT INTO {} (key, molecule, properties) VALUES (?1, json(?2), json(?3));",
            self.table
        );
        self.write("add_entries", commit, |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            for entry in entries {
                let molecule = molecule_json(entry.molecule.as_ref())?;
                let properties = serde_json::to_string(&entry.properties)?;
                stmt.execute(params![entry.key, molecule, properties])
                    .map_err(|err| duplicate_key_or(err, &entry.key))?;
            }
            Ok(())
        })
    }

    /// Updates stored entries.
    ///
    /// - `merge_properties`: patch the stored properties (RFC 7396, a `null`
    ///   value deletes a key) instead of replacing them.
    /// - `upsert`: insert entries whose key is absent; otherwise absent keys
    ///   are skipped silently.
    ///
    /// An entry without a molecule leaves the stored molecule untouched.
    pub fn update_entries<'a, I>(
        &self,
        entries: I,
        merge_properties: bool,
        upsert: bool,
        commit: bool,
    ) -> RepoResult<()>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let table = &self.table;
        let new_properties = if merge_properties {
            "json_patch('{}', ?3)"
        } else {
            "json(?3)"
        };
        let patched_properties = if merge_properties {
            "json_patch(properties, ?3)"
        } else {
            "json(?3)"
        };
        let sql = if upsert {
            format!(
                "INSERT INTO {table} (key, molecule, properties)
                 VALUES (?1, json(?2), {new_properties})
                 ON CONFLICT(key) DO UPDATE SET
                    molecule = coalesce(json(?2), molecule),
                    properties = {patched_properties};"
            )
        } else {
            format!(
                "UPDATE {table}
                 SET
                    molecule = coalesce(json(?2), molecule),
                    properties = {patched_properties}
                 WHERE key = ?1;"
            )
        };

        self.write("update_entries", commit, |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            for entry in entries {
                let molecule = molecule_json(entry.molecule.as_ref())?;
                let properties = serde_json::to_string(&entry.properties)?;
                stmt.execute(params![entry.key, molecule, properties])?;
            }
            Ok(())
        })
    }

    /// Deletes the rows of `keys`, properties included. Absent keys are
    /// ignored.
    pub fn remove_entries<I, S>(&self, keys: I, commit: bool) -> RepoResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys_json(keys)?;
        let sql = format!(
            "DELETE FROM {} WHERE key IN (SELECT value FROM json_each(?1));",
            self.table
        );
        self.write("remove_entries", commit, |conn| {
            conn.execute(&sql, [keys])?;
            Ok(())
        })
    }

    /// Returns the entry stored under `key` when it has a molecule.
    pub fn get_entry(&self, key: &str) -> RepoResult<Option<Entry>> {
        let sql = format!(
            "SELECT rowid, key, molecule, properties FROM {}
             WHERE key = ?1 AND molecule IS NOT NULL;",
            self.table
        );
        self.conn
            .query_row(&sql, [key], |row| Ok(parse_entry_row(row)))
            .optional()?
            .transpose()
    }

    /// Returns the properties of `key`, placeholders included.
    pub fn get_property_entry(&self, key: &str) -> RepoResult<Option<PropertyEntry>> {
        let sql = format!(
            "SELECT rowid, key, properties FROM {} WHERE key = ?1;",
            self.table
        );
        self.conn
            .query_row(&sql, [key], |row| Ok(parse_property_row(row)))
            .optional()?
            .transpose()
    }

    /// Lazily iterates every entry with a molecule in storage order.
    pub fn get_entries(&self) -> RowIter<'_, Entry> {
        RowIter::new(self, true, None, parse_entry_row)
    }

    /// Lazily iterates the entries of `keys` that have a molecule.
    ///
    /// Results come in storage order, not in the order of `keys`; absent keys
    /// are skipped.
    pub fn get_entries_by_keys<I, S>(&self, keys: I) -> RepoResult<RowIter<'_, Entry>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(RowIter::new(
            self,
            true,
            Some(keys_json(keys)?),
            parse_entry_row,
        ))
    }

    /// Lazily iterates the properties of every row in storage order.
    pub fn get_property_entries(&self) -> RowIter<'_, PropertyEntry> {
        RowIter::new(self, false, None, parse_property_row)
    }

    /// Lazily iterates the properties of the rows of `keys`, in storage order.
    pub fn get_property_entries_by_keys<I, S>(
        &self,
        keys: I,
    ) -> RepoResult<RowIter<'_, PropertyEntry>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(RowIter::new(
            self,
            false,
            Some(keys_json(keys)?),
            parse_property_row,
        ))
    }

    /// Whether `key` is stored with a molecule.
    pub fn has_entry(&self, key: &str) -> RepoResult<bool> {
        self.exists(key, true)
    }

    /// Whether any row, placeholder or full entry, is stored under `key`.
    pub fn has_property_entry(&self, key: &str) -> RepoResult<bool> {
        self.exists(key, false)
    }

    /// Number of rows that have a molecule.
    pub fn num_entries(&self) -> RepoResult<u64> {
        self.count(true)
    }

    /// Number of rows, property placeholders included.
    pub fn num_property_entries(&self) -> RepoResult<u64> {
        self.count(false)
    }

    fn exists(&self, key: &str, require_molecule: bool) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE key = ?1{});",
            self.table,
            molecule_filter(require_molecule)
        );
        let exists: bool = self.conn.query_row(&sql, [key], |row| row.get(0))?;
        Ok(exists)
    }

    fn count(&self, require_molecule: bool) -> RepoResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE 1 = 1{};",
            self.table,
            molecule_filter(require_molecule)
        );
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

/// Lazy, forward-only iterator over table rows.
///
/// Rows are fetched in pages ordered by rowid, so the iterator holds no open
/// statement between calls to `next`. Writing to the table while iterating
/// gives unspecified results: rows inserted behind the cursor are skipped,
/// rows inserted ahead of it are returned.
pub struct RowIter<'db, T> {
    db: &'db Database,
    sql: String,
    keys: Option<String>,
    last_rowid: i64,
    buffer: VecDeque<T>,
    exhausted: bool,
    parse: fn(&Row<'_>) -> RepoResult<T>,
}

impl<'db, T> RowIter<'db, T> {
    fn new(
        db: &'db Database,
        require_molecule: bool,
        keys: Option<String>,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> Self {
        let columns = if require_molecule {
            "rowid, key, molecule, properties"
        } else {
            "rowid, key, properties"
        };
        let sql = format!(
            "SELECT {columns} FROM {}
             WHERE rowid > ?1{}
               AND (?3 IS NULL OR key IN (SELECT value FROM json_each(?3)))
             ORDER BY rowid
             LIMIT ?2;",
            db.table,
            molecule_filter(require_molecule)
        );
        Self {
            db,
            sql,
            keys,
            last_rowid: i64::MIN,
            buffer: VecDeque::new(),
            exhausted: false,
            parse,
        }
    }

    fn fetch_page(&mut self) -> RepoResult<()> {
        let db = self.db;
        let mut stmt = db.conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(params![self.last_rowid, PAGE_SIZE, self.keys])?;
        let mut fetched = 0;
        while let Some(row) = rows.next()? {
            self.last_rowid = row.get(0)?;
            self.buffer.push_back((self.parse)(row)?);
            fetched += 1;
        }
        if fetched < PAGE_SIZE {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<T> Iterator for RowIter<'_, T> {
    type Item = RepoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

fn molecule_filter(require_molecule: bool) -> &'static str {
    if require_molecule {
        " AND molecule IS NOT NULL"
    } else {
        ""
    }
}

fn molecule_json(molecule: Option<&Molecule>) -> RepoResult<Option<String>> {
    Ok(molecule.map(serde_json::to_string).transpose()?)
}

fn keys_json<I, S>(keys: I) -> RepoResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keys: Vec<String> = keys.into_iter().map(|key| key.as_ref().to_owned()).collect();
    Ok(serde_json::to_string(&keys)?)
}

fn duplicate_key_or(err: rusqlite::Error, key: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateKey(key.to_string())
        }
        _ => err.into(),
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let key: String = row.get("key")?;
    let molecule = match row.get::<_, Option<String>>("molecule")? {
        Some(text) => Some(serde_json::from_str::<Molecule>(&text).map_err(|err| {
            RepoError::InvalidData(format!("invalid molecule JSON for entry `{key}`: {err}"))
        })?),
        None => None,
    };
    let properties = parse_properties(&key, &row.get::<_, String>("properties")?)?;
    Ok(Entry {
        key,
        molecule,
        properties,
    })
}

fn parse_property_row(row: &Row<'_>) -> RepoResult<PropertyEntry> {
    let key: String = row.get("key")?;
    let properties = parse_properties(&key, &row.get::<_, String>("properties")?)?;
    Ok(PropertyEntry { key, properties })
}

fn parse_properties(key: &str, text: &str) -> RepoResult<Properties> {
    serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid properties JSON for entry `{key}`: {err}"))
    })
}
