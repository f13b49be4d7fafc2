//! Task CRUD, label queries and transactional task creation.

use super::task_labels::refresh_label_cache;
use super::{now_ms, optional, Database};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewTask, Task};
use rusqlite::{params, Connection, Row};
use tracing::debug;

const TASK_COLUMNS: &str = "id, name, full_name, create_date, description, labels, folder_path, \
     create_time, ddl_time, finish_time, status, importance";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        full_name: row.get("full_name")?,
        create_date: row.get("create_date")?,
        description: row.get("description")?,
        labels: row.get("labels")?,
        folder_path: row.get("folder_path")?,
        create_time: row.get("create_time")?,
        ddl_time: row.get("ddl_time")?,
        finish_time: row.get("finish_time")?,
        status: row.get("status")?,
        importance: row.get("importance")?,
    })
}

fn validate(task: &NewTask) -> StoreResult<()> {
    if task.name.is_empty() {
        return Err(StoreError::missing_field("name"));
    }
    if task.folder_path.is_empty() {
        return Err(StoreError::missing_field("folder_path"));
    }
    Ok(())
}

/// Insert using an existing connection, so callers can run it inside a
/// transaction.
pub(crate) fn insert_task_internal(conn: &Connection, task: &NewTask) -> StoreResult<i64> {
    validate(task)?;
    conn.execute(
        "INSERT INTO tasks (name, full_name, create_date, description, folder_path,
                            create_time, ddl_time, finish_time, status, importance)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            task.name,
            task.full_name,
            task.create_date,
            task.description,
            task.folder_path,
            task.create_time.unwrap_or_else(now_ms),
            task.ddl_time,
            task.finish_time,
            task.status,
            task.importance,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_tasks(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> StoreResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let tasks = stmt
        .query_map(args, parse_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

impl Database {
    /// Insert a task and return its id. `create_time` defaults to now.
    pub fn insert_task(&self, task: &NewTask) -> StoreResult<i64> {
        let id = self.with_conn(|conn| insert_task_internal(conn, task))?;
        debug!(task_id = id, name = %task.name, "Inserted task");
        Ok(id)
    }

    /// Get a task by id.
    pub fn get_task(&self, id: i64) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
            optional(conn.query_row(&sql, params![id], parse_task_row))
        })
    }

    /// Replace every writable field of a task except an unset `create_time`.
    /// Returns the number of rows changed (0 if the id does not exist).
    ///
    /// A `create_time` of `None` keeps the stored value. The `labels` cache is
    /// never overwritten; it follows the label relations.
    pub fn update_task(&self, id: i64, task: &NewTask) -> StoreResult<usize> {
        validate(task)?;
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE tasks SET
                    name = ?2, full_name = ?3, create_date = ?4, description = ?5,
                    folder_path = ?6, create_time = COALESCE(?7, create_time),
                    ddl_time = ?8, finish_time = ?9, status = ?10, importance = ?11
                 WHERE id = ?1",
                params![
                    id,
                    task.name,
                    task.full_name,
                    task.create_date,
                    task.description,
                    task.folder_path,
                    task.create_time,
                    task.ddl_time,
                    task.finish_time,
                    task.status,
                    task.importance,
                ],
            )?)
        })?;
        debug!(task_id = id, changed, "Updated task");
        Ok(changed)
    }

    /// Delete a task. Its label and folder relations go with it.
    pub fn delete_task(&self, id: i64) -> StoreResult<usize> {
        let changed =
            self.with_conn(|conn| Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?))?;
        debug!(task_id = id, changed, "Deleted task");
        Ok(changed)
    }

    /// All tasks, ordered by id.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            query_tasks(
                conn,
                &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"),
                [],
            )
        })
    }

    /// Tasks related to the given label id.
    pub fn tasks_by_label_id(&self, label_id: i64) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            query_tasks(
                conn,
                "SELECT DISTINCT t.id, t.name, t.full_name, t.create_date, t.description, t.labels,
                        t.folder_path, t.create_time, t.ddl_time, t.finish_time, t.status, t.importance
                 FROM tasks t
                 JOIN tasks_labels tl ON tl.task_id = t.id
                 WHERE tl.label_id = ?1
                 ORDER BY t.id",
                params![label_id],
            )
        })
    }

    /// Tasks related to any label whose name is exactly `name`.
    pub fn tasks_by_label_name(&self, name: &str) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            query_tasks(
                conn,
                "SELECT DISTINCT t.id, t.name, t.full_name, t.create_date, t.description, t.labels,
                        t.folder_path, t.create_time, t.ddl_time, t.finish_time, t.status, t.importance
                 FROM tasks t
                 JOIN tasks_labels tl ON tl.task_id = t.id
                 WHERE tl.label_id IN (SELECT id FROM labels WHERE name = ?1)
                 ORDER BY t.id",
                params![name],
            )
        })
    }

    /// Find the task stored for a folder path.
    pub fn find_task_by_folder_path(&self, folder_path: &str) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE folder_path = ?1 ORDER BY id LIMIT 1"
            );
            optional(conn.query_row(&sql, params![folder_path], parse_task_row))
        })
    }

    /// Insert a task and attach labels in one transaction. If any label id is
    /// dangling, nothing is written.
    pub fn create_task_with_labels(&self, task: &NewTask, label_ids: &[i64]) -> StoreResult<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task_id = insert_task_internal(&tx, task)?;
            for label_id in label_ids {
                tx.execute(
                    "INSERT INTO tasks_labels (task_id, label_id) VALUES (?1, ?2)",
                    params![task_id, label_id],
                )?;
            }
            refresh_label_cache(&tx, task_id)?;
            tx.commit()?;
            debug!(task_id, labels = label_ids.len(), "Created task with labels");
            Ok(task_id)
        })
    }

    /// Insert a task and link it to a registered folder in one transaction.
    pub fn import_folder_task(&self, task: &NewTask, folder_id: i64) -> StoreResult<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task_id = insert_task_internal(&tx, task)?;
            tx.execute(
                "INSERT INTO folder_tasks (folder_id, task_id) VALUES (?1, ?2)",
                params![folder_id, task_id],
            )?;
            tx.commit()?;
            debug!(task_id, folder_id, "Imported folder task");
            Ok(task_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Importance, TaskStatus};

    fn setup_db() -> Database {
        Database::open_in_memory().expect("Failed to create in-memory database")
    }

    #[test]
    fn insert_then_get_returns_defaults() {
        let db = setup_db();
        let before = now_ms();
        let id = db.insert_task(&NewTask::new("Report", "/work/2024-03-04_01_Report")).unwrap();

        let task = db.get_task(id).unwrap().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.name, "Report");
        assert_eq!(task.folder_path, "/work/2024-03-04_01_Report");
        assert_eq!(task.labels, "");
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.importance, Importance::Normal);
        assert!(task.create_time >= before);
    }

    #[test]
    fn empty_required_fields_are_constraint_errors() {
        let db = setup_db();
        let err = db.insert_task(&NewTask::new("", "/work/x")).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(err.field.as_deref(), Some("name"));

        let err = db.insert_task(&NewTask::new("x", "")).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(err.field.as_deref(), Some("folder_path"));

        assert!(db.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn update_keeps_create_time_when_unset() {
        let db = setup_db();
        let mut new = NewTask::new("a", "/a");
        new.create_time = Some(1_000);
        let id = db.insert_task(&new).unwrap();

        let mut replacement = NewTask::new("b", "/b");
        replacement.status = TaskStatus::Done;
        replacement.finish_time = Some(2_000);
        assert_eq!(db.update_task(id, &replacement).unwrap(), 1);

        let task = db.get_task(id).unwrap().unwrap();
        assert_eq!(task.name, "b");
        assert_eq!(task.create_time, 1_000);
        assert_eq!(task.finish_time, Some(2_000));
        assert_eq!(task.status, TaskStatus::Done);
    }
}
