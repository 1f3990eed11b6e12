//! Path-addressed access to entry properties.
//!
//! Paths use the SQLite JSON path dialect: rooted at `$`, `.name` for object
//! members and `[n]` for array elements.

use super::{Database, RepoError, RepoResult};
use crate::model::entry::PropertyEntry;
use crate::model::json::JsonType;
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

impl Database {
    /// Returns the value at `path` in the properties of `key`.
    ///
    /// A missing key, a missing path and an explicit JSON `null` all return
    /// `None`.
    pub fn get_property(&self, key: &str, path: &str) -> RepoResult<Option<Value>> {
        let sql = format!("SELECT properties -> ?2 FROM {} WHERE key = ?1;", self.table);
        let text: Option<String> = self
            .conn
            .query_row(&sql, params![key, path], |row| row.get(0))
            .optional()?
            .flatten();

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

    /// Writes `value` at `path`, creating missing intermediate objects.
    ///
    /// A key without a row gets a property placeholder holding only `path`.
    /// When an intermediate segment already holds a scalar or an array index
    /// is out of bounds, nothing is written and no error is raised.
    pub fn set_property(
        &self,
        key: &str,
        path: &str,
        value: &Value,
        commit: bool,
    ) -> RepoResult<()> {
        let value = serde_json::to_string(value)?;
        let sql = format!(
            "INSERT INTO {} (key, properties) VALUES (?1, json_set('{{}}', ?2, json(?3)))
             ON CONFLICT(key) DO UPDATE SET properties = json_set(properties, ?2, json(?3));",
            self.table
        );
        self.write("set_property", commit, |conn| {
            conn.execute(&sql, params![key, path, value])?;
            Ok(())
        })
    }

    /// Deletes the value at `path`. Missing keys and paths are ignored.
    pub fn remove_property(&self, key: &str, path: &str, commit: bool) -> RepoResult<()> {
        let sql = format!(
            "UPDATE {} SET properties = json_remove(properties, ?2) WHERE key = ?1;",
            self.table
        );
        self.write("remove_property", commit, |conn| {
            conn.execute(&sql, params![key, path])?;
            Ok(())
        })
    }

    /// Writes properties for many keys, creating placeholders for new keys.
    ///
    /// With `merge` the stored object is patched (RFC 7396: members merge
    /// recursively, `null` deletes, arrays are replaced). Without it the
    /// stored object is replaced.
    pub fn update_properties<'a, I>(&self, entries: I, merge: bool, commit: bool) -> RepoResult<()>
    where
        I: IntoIterator<Item = &'a PropertyEntry>,
    {
        let sql = if merge {
            format!(
                "INSERT INTO {} (key, properties) VALUES (?1, json_patch('{{}}', ?2))
                 ON CONFLICT(key) DO UPDATE SET properties = json_patch(properties, ?2);",
                self.table
            )
        } else {
            format!(
                "INSERT INTO {} (key, properties) VALUES (?1, json(?2))
                 ON CONFLICT(key) DO UPDATE SET properties = excluded.properties;",
                self.table
            )
        };
        self.write("update_properties", commit, |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            for entry in entries {
                let properties = serde_json::to_string(&entry.properties)?;
                stmt.execute(params![entry.key, properties])?;
            }
            Ok(())
        })
    }

    pub fn get_bool_property(&self, key: &str, path: &str) -> RepoResult<Option<bool>> {
        self.get_typed(key, path, JsonType::Bool, |value| value.as_bool())
    }

    pub fn get_int_property(&self, key: &str, path: &str) -> RepoResult<Option<i64>> {
        self.get_typed(key, path, JsonType::Integer, |value| value.as_i64())
    }

    pub fn get_float_property(&self, key: &str, path: &str) -> RepoResult<Option<f64>> {
        self.get_typed(key, path, JsonType::Real, |value| value.as_f64())
    }

    pub fn get_str_property(&self, key: &str, path: &str) -> RepoResult<Option<String>> {
        self.get_typed(key, path, JsonType::Text, |value| match value {
            Value::String(text) => Some(text),
            _ => None,
        })
    }

    pub fn get_dict_property(
        &self,
        key: &str,
        path: &str,
    ) -> RepoResult<Option<Map<String, Value>>> {
        self.get_typed(key, path, JsonType::Object, |value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
    }

    pub fn get_list_property(&self, key: &str, path: &str) -> RepoResult<Option<Vec<Value>>> {
        self.get_typed(key, path, JsonType::Array, |value| match value {
            Value::Array(items) => Some(items),
            _ => None,
        })
    }

    pub fn set_bool_property(
        &self,
        key: &str,
        path: &str,
        value: bool,
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::Bool(value), commit)
    }

    pub fn set_int_property(
        &self,
        key: &str,
        path: &str,
        value: i64,
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::from(value), commit)
    }

    /// Stores `value` as a JSON real. Non-finite values are stored as `null`.
    pub fn set_float_property(
        &self,
        key: &str,
        path: &str,
        value: f64,
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::from(value), commit)
    }

    pub fn set_str_property(
        &self,
        key: &str,
        path: &str,
        value: &str,
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::from(value), commit)
    }

    pub fn set_dict_property(
        &self,
        key: &str,
        path: &str,
        value: &Map<String, Value>,
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::Object(value.clone()), commit)
    }

    pub fn set_list_property(
        &self,
        key: &str,
        path: &str,
        value: &[Value],
        commit: bool,
    ) -> RepoResult<()> {
        self.set_property(key, path, &Value::Array(value.to_vec()), commit)
    }

    fn get_typed<T>(
        &self,
        key: &str,
        path: &str,
        expected: JsonType,
        extract: impl FnOnce(Value) -> Option<T>,
    ) -> RepoResult<Option<T>> {
        let Some(value) = self.get_property(key, path)? else {
            return Ok(None);
        };
        let actual = JsonType::of(&value);
        if actual != expected {
            return Err(RepoError::TypeMismatch {
                key: key.to_string(),
                path: path.to_string(),
                expected,
                actual,
            });
        }
        extract(value).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "{expected} value at `{path}` for entry `{key}` is out of range"
            ))
        })
    }
}
