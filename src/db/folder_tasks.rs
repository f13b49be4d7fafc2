//! Folder ↔ task relations.

use super::{optional, Database};
use crate::error::StoreResult;
use crate::types::FolderTask;
use rusqlite::{params, Row};

fn parse_folder_task_row(row: &Row) -> rusqlite::Result<FolderTask> {
    Ok(FolderTask {
        folder_id: row.get(0)?,
        task_id: row.get(1)?,
    })
}

impl Database {
    /// Link a task to a registered folder. Fails with a constraint error if
    /// either id is dangling or the pair already exists.
    pub fn insert_folder_task(&self, folder_id: i64, task_id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO folder_tasks (folder_id, task_id) VALUES (?1, ?2)",
                params![folder_id, task_id],
            )?;
            Ok(())
        })
    }

    pub fn get_folder_task(&self, folder_id: i64, task_id: i64) -> StoreResult<Option<FolderTask>> {
        self.with_conn(|conn| {
            optional(conn.query_row(
                "SELECT folder_id, task_id FROM folder_tasks WHERE folder_id = ?1 AND task_id = ?2",
                params![folder_id, task_id],
                parse_folder_task_row,
            ))
        })
    }

    pub fn update_folder_task(
        &self,
        folder_id: i64,
        task_id: i64,
        new_folder_id: i64,
        new_task_id: i64,
    ) -> StoreResult<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE folder_tasks SET folder_id = ?3, task_id = ?4
                 WHERE folder_id = ?1 AND task_id = ?2",
                params![folder_id, task_id, new_folder_id, new_task_id],
            )?)
        })
    }

    pub fn delete_folder_task(&self, folder_id: i64, task_id: i64) -> StoreResult<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM folder_tasks WHERE folder_id = ?1 AND task_id = ?2",
                params![folder_id, task_id],
            )?)
        })
    }

    /// All folder ↔ task relations, in insertion order.
    pub fn list_folder_tasks(&self) -> StoreResult<Vec<FolderTask>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT folder_id, task_id FROM folder_tasks ORDER BY rowid")?;
            let rows = stmt
                .query_map([], parse_folder_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Ids of tasks linked to a folder.
    pub fn task_ids_for_folder(&self, folder_id: i64) -> StoreResult<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT task_id FROM folder_tasks WHERE folder_id = ?1 ORDER BY rowid")?;
            let ids = stmt
                .query_map(params![folder_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            Ok(ids)
        })
    }
}
