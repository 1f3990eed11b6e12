use super::{validate_table_name, DbResult};
use rusqlite::Connection;

/// Creates the molecule table `table` when it does not exist yet.
pub fn ensure_molecule_table(conn: &Connection, table: &str) -> DbResult<()> {
    validate_table_name(table)?;
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            key TEXT PRIMARY KEY NOT NULL,
            molecule JSON,
            properties JSON NOT NULL DEFAULT '{{}}'
        );"
    ))?;
    Ok(())
}
