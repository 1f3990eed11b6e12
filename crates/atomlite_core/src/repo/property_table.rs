//! Tabular projection of properties across many entries.
//!
//! # Responsibility
//! - Resolve several JSON paths for every row in one scan.
//! - Drop or keep rows with unresolved paths according to `Inclusion`.
//!
//! # Invariants
//! - A JSON `null` counts as unresolved.
//! - Values keep their JSON type; nothing is stringified or coerced.
//! - Rows appear in storage order; the key column is always present.

use super::{Database, RepoError, RepoResult};
use crate::model::json::JsonType;
use log::debug;
use rusqlite::params_from_iter;
use serde_json::Value;

/// Row inclusion rule for `Database::get_property_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusion {
    /// Keep rows where every path resolves.
    #[default]
    All,
    /// Keep rows where at least one path resolves; the rest are `None`.
    Any,
}

/// Column-oriented result of a property extraction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyTable {
    paths: Vec<String>,
    keys: Vec<String>,
    columns: Vec<Vec<Option<Value>>>,
}

impl PropertyTable {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Values extracted for `path`, one per row.
    pub fn column(&self, path: &str) -> Option<&[Option<Value>]> {
        let index = self.paths.iter().position(|candidate| candidate == path)?;
        Some(&self.columns[index])
    }

    /// The JSON type shared by every resolved value of `path`.
    ///
    /// `None` when the column is unknown, has no resolved values, or mixes
    /// types.
    pub fn column_type(&self, path: &str) -> Option<JsonType> {
        let mut types = self.column(path)?.iter().flatten().map(JsonType::of);
        let first = types.next()?;
        types.all(|kind| kind == first).then_some(first)
    }

    /// Row `index` as `(key, values in path order)`.
    pub fn row(&self, index: usize) -> Option<(&str, Vec<Option<&Value>>)> {
        let key = self.keys.get(index)?;
        let values = self
            .columns
            .iter()
            .map(|column| column[index].as_ref())
            .collect();
        Some((key.as_str(), values))
    }
}

impl Database {
    /// Extracts `paths` from the properties of every row.
    pub fn get_property_table(
        &self,
        paths: &[&str],
        inclusion: Inclusion,
    ) -> RepoResult<PropertyTable> {
        let selected: Vec<String> = (1..=paths.len())
            .map(|param| format!("properties -> ?{param}"))
            .collect();
        let resolved: Vec<String> = (1..=paths.len())
            .map(|param| format!("properties ->> ?{param} IS NOT NULL"))
            .collect();
        let predicate = match (inclusion, resolved.is_empty()) {
            (_, true) => "1 = 1".to_string(),
            (Inclusion::All, false) => resolved.join(" AND "),
            (Inclusion::Any, false) => resolved.join(" OR "),
        };
        let mut columns_sql = String::from("key");
        for column in &selected {
            columns_sql.push_str(", ");
            columns_sql.push_str(column);
        }
        let sql = format!(
            "SELECT {columns_sql} FROM {} WHERE {predicate} ORDER BY rowid;",
            self.table
        );

        let mut table = PropertyTable {
            paths: paths.iter().map(|path| path.to_string()).collect(),
            keys: Vec::new(),
            columns: vec![Vec::new(); paths.len()],
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(paths.iter()))?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            for (index, column) in table.columns.iter_mut().enumerate() {
                let text: Option<String> = row.get(index + 1)?;
                column.push(parse_cell(&key, paths[index], text)?);
            }
            table.keys.push(key);
        }

        debug!(
            "event=property_table module=repo status=ok table={} paths={} rows={}",
            self.table,
            paths.len(),
            table.len()
        );
        Ok(table)
    }
}

fn parse_cell(key: &str, path: &str, text: Option<String>) -> RepoResult<Option<Value>> {
    let Some(text) = text else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(RepoError::InvalidData(format!(
            "invalid JSON at `{path}` for entry `{key}`: {err}"
        ))),
    }
}
