//! Task ↔ label relations and the denormalized `tasks.labels` cache.
//!
//! The `tasks_labels` junction is the source of truth. Every write that can
//! change a task's label set recomputes that task's `labels` string: label
//! names ordered by label id, joined with `,`.

use super::{optional, Database};
use crate::error::StoreResult;
use crate::types::TaskLabel;
use rusqlite::{params, Connection};
use tracing::debug;

/// Recompute the comma-joined label names stored on a task.
pub(crate) fn refresh_label_cache(conn: &Connection, task_id: i64) -> StoreResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT l.name FROM tasks_labels tl
         JOIN labels l ON l.id = tl.label_id
         WHERE tl.task_id = ?1
         ORDER BY l.id",
    )?;
    let names = stmt
        .query_map(params![task_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    conn.execute(
        "UPDATE tasks SET labels = ?2 WHERE id = ?1",
        params![task_id, names.join(",")],
    )?;
    Ok(())
}

/// Task ids related to a label.
pub(crate) fn task_ids_for_label(conn: &Connection, label_id: i64) -> StoreResult<Vec<i64>> {
    let mut stmt = conn.prepare_cached("SELECT task_id FROM tasks_labels WHERE label_id = ?1")?;
    let ids = stmt
        .query_map(params![label_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

impl Database {
    /// Relate a task to a label. Fails with a constraint error if either id is
    /// dangling or the pair already exists.
    pub fn insert_task_label(&self, task_id: i64, label_id: i64) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO tasks_labels (task_id, label_id) VALUES (?1, ?2)",
                params![task_id, label_id],
            )?;
            refresh_label_cache(&tx, task_id)?;
            tx.commit()?;
            Ok(())
        })?;
        debug!(task_id, label_id, "Added task label");
        Ok(())
    }

    pub fn get_task_label(&self, task_id: i64, label_id: i64) -> StoreResult<Option<TaskLabel>> {
        self.with_conn(|conn| {
            optional(conn.query_row(
                "SELECT task_id, label_id FROM tasks_labels WHERE task_id = ?1 AND label_id = ?2",
                params![task_id, label_id],
                |row| {
                    Ok(TaskLabel {
                        task_id: row.get(0)?,
                        label_id: row.get(1)?,
                    })
                },
            ))
        })
    }

    /// Move a relation to a new pair. Returns 0 if the old pair does not exist.
    pub fn update_task_label(
        &self,
        task_id: i64,
        label_id: i64,
        new_task_id: i64,
        new_label_id: i64,
    ) -> StoreResult<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE tasks_labels SET task_id = ?3, label_id = ?4
                 WHERE task_id = ?1 AND label_id = ?2",
                params![task_id, label_id, new_task_id, new_label_id],
            )?;
            if changed > 0 {
                refresh_label_cache(&tx, task_id)?;
                if new_task_id != task_id {
                    refresh_label_cache(&tx, new_task_id)?;
                }
            }
            tx.commit()?;
            Ok(changed)
        })
    }

    pub fn delete_task_label(&self, task_id: i64, label_id: i64) -> StoreResult<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "DELETE FROM tasks_labels WHERE task_id = ?1 AND label_id = ?2",
                params![task_id, label_id],
            )?;
            if changed > 0 {
                refresh_label_cache(&tx, task_id)?;
            }
            tx.commit()?;
            Ok(changed)
        })
    }

    /// All task ↔ label relations, in insertion order.
    pub fn list_task_labels(&self) -> StoreResult<Vec<TaskLabel>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT task_id, label_id FROM tasks_labels ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TaskLabel {
                        task_id: row.get(0)?,
                        label_id: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
