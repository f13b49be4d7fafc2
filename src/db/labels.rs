//! Label CRUD.

use super::task_labels::{refresh_label_cache, task_ids_for_label};
use super::{optional, Database};
use crate::error::{StoreError, StoreResult};
use crate::types::{Label, NewLabel};
use rusqlite::{params, Row};
use tracing::debug;

fn parse_label_row(row: &Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        importance: row.get("importance")?,
    })
}

impl Database {
    pub fn insert_label(&self, label: &NewLabel) -> StoreResult<i64> {
        if label.name.is_empty() {
            return Err(StoreError::missing_field("name"));
        }
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO labels (name, importance) VALUES (?1, ?2)",
                params![label.name, label.importance],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        debug!(label_id = id, name = %label.name, "Inserted label");
        Ok(id)
    }

    pub fn get_label(&self, id: i64) -> StoreResult<Option<Label>> {
        self.with_conn(|conn| {
            optional(conn.query_row(
                "SELECT id, name, importance FROM labels WHERE id = ?1",
                params![id],
                parse_label_row,
            ))
        })
    }

    /// Replace a label's fields. A rename is reflected in the `labels` cache
    /// of every related task.
    pub fn update_label(&self, id: i64, label: &NewLabel) -> StoreResult<usize> {
        if label.name.is_empty() {
            return Err(StoreError::missing_field("name"));
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE labels SET name = ?2, importance = ?3 WHERE id = ?1",
                params![id, label.name, label.importance],
            )?;
            if changed > 0 {
                for task_id in task_ids_for_label(&tx, id)? {
                    refresh_label_cache(&tx, task_id)?;
                }
            }
            tx.commit()?;
            Ok(changed)
        })
    }

    /// Delete a label. Its task relations are removed and the affected
    /// tasks' `labels` cache is refreshed.
    pub fn delete_label(&self, id: i64) -> StoreResult<usize> {
        let changed = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let affected = task_ids_for_label(&tx, id)?;
            let changed = tx.execute("DELETE FROM labels WHERE id = ?1", params![id])?;
            for task_id in affected {
                refresh_label_cache(&tx, task_id)?;
            }
            tx.commit()?;
            Ok(changed)
        })?;
        debug!(label_id = id, changed, "Deleted label");
        Ok(changed)
    }

    pub fn list_labels(&self) -> StoreResult<Vec<Label>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, importance FROM labels ORDER BY id")?;
            let labels = stmt
                .query_map([], parse_label_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(labels)
        })
    }

    /// Labels whose name matches exactly.
    pub fn find_labels_by_name(&self, name: &str) -> StoreResult<Vec<Label>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, importance FROM labels WHERE name = ?1 ORDER BY id")?;
            let labels = stmt
                .query_map(params![name], parse_label_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(labels)
        })
    }

    /// Labels related to a task, ordered by label id.
    pub fn labels_for_task(&self, task_id: i64) -> StoreResult<Vec<Label>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.name, l.importance FROM labels l
                 JOIN tasks_labels tl ON tl.label_id = l.id
                 WHERE tl.task_id = ?1
                 ORDER BY l.id",
            )?;
            let labels = stmt
                .query_map(params![task_id], parse_label_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(labels)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Importance, NewTask};

    #[test]
    fn rename_updates_task_cache() {
        let db = Database::open_in_memory().unwrap();
        let task = db.insert_task(&NewTask::new("t", "/t")).unwrap();
        let label = db.insert_label(&NewLabel::new("draft")).unwrap();
        db.insert_task_label(task, label).unwrap();

        let renamed = NewLabel {
            name: "final".to_string(),
            importance: Importance::Important,
        };
        assert_eq!(db.update_label(label, &renamed).unwrap(), 1);
        assert_eq!(db.get_task(task).unwrap().unwrap().labels, "final");
        assert_eq!(
            db.get_label(label).unwrap().unwrap().importance,
            Importance::Important
        );
    }

    #[test]
    fn delete_clears_relations_and_cache() {
        let db = Database::open_in_memory().unwrap();
        let task = db.insert_task(&NewTask::new("t", "/t")).unwrap();
        let label = db.insert_label(&NewLabel::new("draft")).unwrap();
        db.insert_task_label(task, label).unwrap();

        assert_eq!(db.delete_label(label).unwrap(), 1);
        assert!(db.list_task_labels().unwrap().is_empty());
        assert_eq!(db.get_task(task).unwrap().unwrap().labels, "");
        assert_eq!(db.delete_label(label).unwrap(), 0);
    }

    #[test]
    fn empty_name_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_label(&NewLabel::new("")).unwrap_err().is_constraint());
    }
}
