//! Folder path registry.

use super::{optional, Database};
use crate::error::{StoreError, StoreResult};
use crate::types::{FolderPath, NewFolderPath};
use rusqlite::{params, Row};
use tracing::debug;

fn parse_folder_row(row: &Row) -> rusqlite::Result<FolderPath> {
    Ok(FolderPath {
        id: row.get("id")?,
        path: row.get("path")?,
    })
}

impl Database {
    pub fn insert_folder_path(&self, folder: &NewFolderPath) -> StoreResult<i64> {
        if folder.path.is_empty() {
            return Err(StoreError::missing_field("path"));
        }
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO folder_path (path) VALUES (?1)",
                params![folder.path],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        debug!(folder_id = id, path = %folder.path, "Registered folder path");
        Ok(id)
    }

    pub fn get_folder_path(&self, id: i64) -> StoreResult<Option<FolderPath>> {
        self.with_conn(|conn| {
            optional(conn.query_row(
                "SELECT id, path FROM folder_path WHERE id = ?1",
                params![id],
                parse_folder_row,
            ))
        })
    }

    pub fn update_folder_path(&self, id: i64, folder: &NewFolderPath) -> StoreResult<usize> {
        if folder.path.is_empty() {
            return Err(StoreError::missing_field("path"));
        }
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE folder_path SET path = ?2 WHERE id = ?1",
                params![id, folder.path],
            )?)
        })
    }

    /// Remove a folder path and its task links. The tasks themselves stay.
    pub fn delete_folder_path(&self, id: i64) -> StoreResult<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM folder_path WHERE id = ?1", params![id])?)
        })
    }

    pub fn list_folder_paths(&self) -> StoreResult<Vec<FolderPath>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, path FROM folder_path ORDER BY id")?;
            let folders = stmt
                .query_map([], parse_folder_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(folders)
        })
    }

    /// First registered entry with exactly this path.
    pub fn find_folder_path(&self, path: &str) -> StoreResult<Option<FolderPath>> {
        self.with_conn(|conn| {
            optional(conn.query_row(
                "SELECT id, path FROM folder_path WHERE path = ?1 ORDER BY id LIMIT 1",
                params![path],
                parse_folder_row,
            ))
        })
    }
}
