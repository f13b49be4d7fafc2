//! Core types for the task folder catalog.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Completion state of a task. Stored as an integer (0 = open, 1 = done).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            TaskStatus::Open => 0,
            TaskStatus::Done => 1,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(TaskStatus::Open),
            1 => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance of a task or label. Stored as an integer (0 = normal, 1 = important).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Normal,
    Important,
}

impl Importance {
    pub fn as_i64(self) -> i64 {
        match self {
            Importance::Normal => 0,
            Importance::Important => 1,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Importance::Normal),
            1 => Some(Importance::Important),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Importance::Normal => "normal",
            Importance::Important => "important",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_int_enum_sql {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_i64()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let v = value.as_i64()?;
                <$ty>::from_i64(v).ok_or(FromSqlError::OutOfRange(v))
            }
        }
    };
}

impl_int_enum_sql!(TaskStatus);
impl_int_enum_sql!(Importance);

/// A task folder found on disk. Produced by the scanner, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFolderDescriptor {
    pub title: String,
    /// The `YYYY-MM-DD` segment of the folder name, verbatim.
    pub date: String,
    pub sequence_number: u8,
    pub folder_path: PathBuf,
    pub root_path: PathBuf,
}

impl TaskFolderDescriptor {
    /// The folder's own name (last path component).
    pub fn folder_name(&self) -> String {
        self.folder_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub full_name: Option<String>,
    pub create_date: Option<String>,
    pub description: Option<String>,
    /// Comma-joined label names, kept in sync with the `tasks_labels` junction.
    pub labels: String,
    pub folder_path: String,
    /// Milliseconds since the Unix epoch.
    pub create_time: i64,
    pub ddl_time: Option<i64>,
    pub finish_time: Option<i64>,
    pub status: TaskStatus,
    pub importance: Importance,
}

/// Writable fields of a task, used for insert and full-row update.
///
/// `create_time` of `None` means "now" on insert; on update it keeps the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub full_name: Option<String>,
    pub create_date: Option<String>,
    pub description: Option<String>,
    pub folder_path: String,
    pub create_time: Option<i64>,
    pub ddl_time: Option<i64>,
    pub finish_time: Option<i64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub importance: Importance,
}

impl NewTask {
    pub fn new(name: impl Into<String>, folder_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder_path: folder_path.into(),
            ..Default::default()
        }
    }

    /// Build a task from a scanned folder: the title becomes the name and the
    /// folder name is kept as `full_name`.
    pub fn from_descriptor(desc: &TaskFolderDescriptor) -> Self {
        Self {
            name: desc.title.clone(),
            full_name: Some(desc.folder_name()),
            create_date: Some(desc.date.clone()),
            folder_path: desc.folder_path.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }
}

/// A persisted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
    #[serde(default)]
    pub importance: Importance,
}

impl NewLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            importance: Importance::Normal,
        }
    }
}

/// A registered folder root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPath {
    pub id: i64,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFolderPath {
    pub path: String,
}

impl NewFolderPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Task ↔ label relation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLabel {
    pub task_id: i64,
    pub label_id: i64,
}

/// Folder ↔ task relation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTask {
    pub folder_id: i64,
    pub task_id: i64,
}
