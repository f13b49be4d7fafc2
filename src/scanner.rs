//! Task folder discovery.
//!
//! A task folder is a directory named `YYYY-MM-DD_NN_<title>`, where `NN` is a
//! one or two digit sequence number and the date is a real calendar date.
//! The title is everything after the second underscore and may itself
//! contain underscores.

use crate::error::{StoreError, StoreResult};
use crate::types::TaskFolderDescriptor;
use chrono::NaiveDate;
use regex_lite::Regex;
use std::iter::FusedIterator;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, trace};

static TASK_FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})_(\d{1,2})_(.+)$").expect("task folder pattern is valid")
});

/// The parts of a valid task folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFolderName {
    pub date: NaiveDate,
    /// The date segment exactly as written in the name.
    pub date_text: String,
    pub sequence_number: u8,
    pub title: String,
}

/// Parse a directory name (not a path) as a task folder name.
///
/// Returns `None` when the name does not have the `YYYY-MM-DD_NN_<title>`
/// shape or when the date part is not a real calendar date.
pub fn parse_task_folder_name(name: &str) -> Option<TaskFolderName> {
    let caps = TASK_FOLDER_RE.captures(name)?;

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let sequence_number: u8 = caps[4].parse().ok()?;

    // The date never contains '_', so the first segment is the date and the
    // greedy capture is the same as splitting into at most three segments.
    let mut parts = name.splitn(3, '_');
    let date_text = parts.next()?.to_string();
    let _sequence = parts.next()?;
    let title = parts.next()?.to_string();

    Some(TaskFolderName {
        date,
        date_text,
        sequence_number,
        title,
    })
}

/// Whether `name` is a valid task folder name.
pub fn is_task_folder_name(name: &str) -> bool {
    parse_task_folder_name(name).is_some()
}

/// List one root's immediate child directories that are task folders.
///
/// The root is read all-or-nothing: if it is missing, is not a directory, or
/// any entry fails to list, no descriptors are returned. Entries come back in
/// filesystem order.
pub fn scan_root(root: &Path) -> StoreResult<Vec<TaskFolderDescriptor>> {
    let meta = std::fs::metadata(root).map_err(|e| StoreError::filesystem(root, e))?;
    if !meta.is_dir() {
        return Err(StoreError::filesystem(root, "not a directory"));
    }

    let entries = std::fs::read_dir(root).map_err(|e| StoreError::filesystem(root, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::filesystem(root, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| StoreError::filesystem(root, e))?;
        let is_dir = file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir());
        if !is_dir {
            continue;
        }

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            trace!(entry = ?file_name, "Skipping non UTF-8 entry");
            continue;
        };

        match parse_task_folder_name(name) {
            Some(parsed) => found.push(TaskFolderDescriptor {
                title: parsed.title,
                date: parsed.date_text,
                sequence_number: parsed.sequence_number,
                folder_path: root.join(name),
                root_path: root.to_path_buf(),
            }),
            None => trace!(entry = name, "Not a task folder"),
        }
    }

    debug!(root = %root.display(), count = found.len(), "Scanned root");
    Ok(found)
}

/// Lazy scan over several roots. See [`scan`].
#[derive(Debug)]
pub struct Scan<I> {
    roots: I,
    pending: std::vec::IntoIter<TaskFolderDescriptor>,
    done: bool,
}

impl<I> Iterator for Scan<I>
where
    I: Iterator,
    I::Item: AsRef<Path>,
{
    type Item = StoreResult<TaskFolderDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(desc) = self.pending.next() {
                return Some(Ok(desc));
            }
            let Some(root) = self.roots.next() else {
                self.done = true;
                return None;
            };
            match scan_root(root.as_ref()) {
                Ok(found) => self.pending = found.into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<I> FusedIterator for Scan<I>
where
    I: Iterator,
    I::Item: AsRef<Path>,
{
}

/// Scan roots in order, yielding task folder descriptors root by root.
///
/// Each root is listed only when the iterator reaches it. A failing root
/// yields a single `FilesystemError` and ends the scan; callers that want to
/// skip bad roots should use [`scan_root`] per root instead. Descriptors are
/// not deduplicated across roots.
pub fn scan<I>(roots: I) -> Scan<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    Scan {
        roots: roots.into_iter(),
        pending: Vec::new().into_iter(),
        done: false,
    }
}

/// Collect a full scan, stopping at the first failing root.
pub fn scan_all<I>(roots: I) -> StoreResult<Vec<TaskFolderDescriptor>>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    scan(roots).collect()
}
