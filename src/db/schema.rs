//! Schema introspection and legacy-schema detection.

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;

/// Columns each table must have. Tables created by an older field set (for
/// example a `tasks` table without `ddl_time`) fail the check instead of
/// being altered in place.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "tasks",
        &[
            "id",
            "name",
            "full_name",
            "create_date",
            "description",
            "labels",
            "folder_path",
            "create_time",
            "ddl_time",
            "finish_time",
            "status",
            "importance",
        ],
    ),
    ("labels", &["id", "name", "importance"]),
    ("folder_path", &["id", "path"]),
    ("tasks_labels", &["task_id", "label_id"]),
    ("folder_tasks", &["folder_id", "task_id"]),
];

/// Junction tables: each listed column is part of the pair key and must
/// reference its parent table with `ON DELETE CASCADE`.
pub const JUNCTION_TABLES: &[(&str, &[(&str, &str)])] = &[
    ("tasks_labels", &[("task_id", "tasks"), ("label_id", "labels")]),
    ("folder_tasks", &[("folder_id", "folder_path"), ("task_id", "tasks")]),
];

/// A column as reported by `pragma_table_info`.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub primary_key: bool,
}

/// A foreign key as reported by `pragma_foreign_key_list`.
#[derive(Debug, Clone)]
pub struct ForeignKeyInfo {
    pub from_column: String,
    pub to_table: String,
    pub on_delete: String,
}

pub(crate) fn table_columns(conn: &Connection, table: &str) -> StoreResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare("SELECT name, pk FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                primary_key: row.get::<_, i64>(1)? > 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

pub(crate) fn table_foreign_keys(
    conn: &Connection,
    table: &str,
) -> StoreResult<Vec<ForeignKeyInfo>> {
    let mut stmt = conn.prepare(
        "SELECT \"from\", \"table\", on_delete FROM pragma_foreign_key_list(?1)",
    )?;
    let fks = stmt
        .query_map([table], |row| {
            Ok(ForeignKeyInfo {
                from_column: row.get(0)?,
                to_table: row.get(1)?,
                on_delete: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fks)
}

/// Fail with `SchemaMismatch` if any known table already exists without all
/// of its required columns, or if a junction table lacks its pair key or
/// cascading references. Missing tables are fine; migrations create them.
pub(crate) fn check_existing_tables(conn: &Connection) -> StoreResult<()> {
    for (table, required) in REQUIRED_COLUMNS {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            continue;
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|col| !columns.iter().any(|c| c.name == **col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::schema_mismatch(table, &missing));
        }
    }

    for (table, refs) in JUNCTION_TABLES {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            continue;
        }
        check_junction(conn, table, &columns, refs)?;
    }
    Ok(())
}

fn check_junction(
    conn: &Connection,
    table: &str,
    columns: &[ColumnInfo],
    refs: &[(&str, &str)],
) -> StoreResult<()> {
    let fks = table_foreign_keys(conn, table)?;
    for (column, parent) in refs {
        let keyed = columns
            .iter()
            .any(|c| c.name == *column && c.primary_key);
        if !keyed {
            return Err(StoreError::junction_mismatch(
                table,
                format!("does not key pairs on {column}"),
            ));
        }

        let cascades = fks.iter().any(|fk| {
            fk.from_column == *column
                && fk.to_table == *parent
                && fk.on_delete.eq_ignore_ascii_case("CASCADE")
        });
        if !cascades {
            return Err(StoreError::junction_mismatch(
                table,
                format!("does not cascade deletes from {parent} through {column}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::ErrorCode;

    #[test]
    fn fresh_store_passes_its_own_check() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            for (table, _) in REQUIRED_COLUMNS {
                assert!(!table_columns(conn, table)?.is_empty(), "missing table {table}");
            }
            check_existing_tables(conn)
        })
        .unwrap();
    }

    #[test]
    fn junctions_cascade_on_delete() {
        let db = Database::open_in_memory().unwrap();
        let fks = db
            .with_conn(|conn| table_foreign_keys(conn, "tasks_labels"))
            .unwrap();
        assert_eq!(fks.len(), 2);
        assert!(fks.iter().all(|fk| fk.on_delete == "CASCADE"));
    }

    #[test]
    fn legacy_tasks_table_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                labels TEXT,
                folder_path TEXT NOT NULL,
                create_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                finish_time TIMESTAMP,
                status INTEGER DEFAULT 0,
                imporance INTEGER DEFAULT 0
            );",
        )
        .unwrap();

        let err = check_existing_tables(&conn).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        assert!(err.message.contains("ddl_time"));
        assert!(err.message.contains("importance"));
    }

    #[test]
    fn unkeyed_junction_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE folder_tasks (
                folder_id INTEGER NOT NULL,
                task_id INTEGER NOT NULL,
                FOREIGN KEY (folder_id) REFERENCES folder_path(id),
                FOREIGN KEY (task_id) REFERENCES tasks(id)
            );",
        )
        .unwrap();

        let err = check_existing_tables(&conn).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        assert_eq!(err.field.as_deref(), Some("folder_tasks"));
        assert!(err.message.contains("folder_id"));
    }

    #[test]
    fn keyed_junction_without_cascade_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks_labels (
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                label_id INTEGER NOT NULL REFERENCES labels(id),
                PRIMARY KEY (task_id, label_id)
            );",
        )
        .unwrap();

        let err = check_existing_tables(&conn).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        assert!(err.message.contains("cascade"));
        assert!(err.message.contains("labels"));
    }
}
