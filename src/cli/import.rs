//! Import subcommand for task-folders CLI
//!
//! Records scanned task folders in the database. Each root is registered as
//! a folder path, and each task folder not yet stored (matched by folder
//! path) becomes a task linked to its root.

use crate::db::Database;
use crate::error::StoreResult;
use crate::types::{NewFolderPath, NewTask, TaskFolderDescriptor};
use clap::Args;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Root directories to scan (defaults to the configured roots)
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Report what would be imported without modifying the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Ids of tasks created (empty on a dry run).
    pub created: Vec<i64>,
    /// Folders that would be created on a dry run, or were created otherwise.
    pub would_create: usize,
    /// Folders already stored as tasks.
    pub skipped: usize,
    /// Folder roots registered during this run.
    pub roots_registered: usize,
}

/// Reconcile scanned folders with the store.
///
/// Folders whose path is already recorded on a task are skipped. Each new
/// task is inserted together with its folder link in one transaction.
pub fn import_descriptors(
    db: &Database,
    descriptors: &[TaskFolderDescriptor],
    dry_run: bool,
) -> StoreResult<ImportResult> {
    let mut result = ImportResult::default();
    let mut root_ids: HashMap<String, i64> = HashMap::new();

    for desc in descriptors {
        let new_task = NewTask::from_descriptor(desc);

        if db.find_task_by_folder_path(&new_task.folder_path)?.is_some() {
            debug!(folder = %new_task.folder_path, "Task already stored");
            result.skipped += 1;
            continue;
        }

        result.would_create += 1;
        if dry_run {
            continue;
        }

        let root = desc.root_path.to_string_lossy().into_owned();
        let folder_id = match root_ids.get(&root) {
            Some(id) => *id,
            None => {
                let id = match db.find_folder_path(&root)? {
                    Some(existing) => existing.id,
                    None => {
                        result.roots_registered += 1;
                        db.insert_folder_path(&NewFolderPath::new(root.clone()))?
                    }
                };
                root_ids.insert(root, id);
                id
            }
        };

        let task_id = db.import_folder_task(&new_task, folder_id)?;
        result.created.push(task_id);
    }

    info!(
        created = result.created.len(),
        skipped = result.skipped,
        dry_run,
        "Import finished"
    );
    Ok(result)
}
