//! Output formatting utilities for markdown and JSON.

use crate::types::{Importance, Label, Task, TaskFolderDescriptor, TaskStatus};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Pretty JSON for any serializable result.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Format scanned task folders as markdown, grouped under their root.
pub fn format_descriptors_markdown(descriptors: &[TaskFolderDescriptor]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Task folders ({})\n\n", descriptors.len()));

    let mut current_root = None;
    for desc in descriptors {
        if current_root != Some(&desc.root_path) {
            md.push_str(&format!("## {}\n\n", desc.root_path.display()));
            current_root = Some(&desc.root_path);
        }
        md.push_str(&format!(
            "- {} #{:02} {}\n",
            desc.date, desc.sequence_number, desc.title
        ));
    }

    md
}

/// Format a task in short form for lists.
fn format_task_short(task: &Task) -> String {
    let importance_marker = match task.importance {
        Importance::Important => "!!! ",
        Importance::Normal => "",
    };

    let labels = if task.labels.is_empty() {
        String::new()
    } else {
        format!(" [{}]", task.labels)
    };

    let date = task
        .create_date
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default();

    format!(
        "- {}{} `{}`{}{}\n",
        importance_marker, task.name, task.id, date, labels
    )
}

/// Format a list of tasks as markdown, open tasks first.
pub fn format_tasks_markdown(tasks: &[Task]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Tasks ({})\n\n", tasks.len()));

    for (status, heading) in [(TaskStatus::Open, "Open"), (TaskStatus::Done, "Done")] {
        let group: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        if group.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", heading));
        for task in group {
            md.push_str(&format_task_short(task));
        }
        md.push('\n');
    }

    md
}

/// Format labels as markdown.
pub fn format_labels_markdown(labels: &[Label]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Labels ({})\n\n", labels.len()));

    for label in labels {
        let marker = match label.importance {
            Importance::Important => " !!!",
            Importance::Normal => "",
        };
        md.push_str(&format!("- {} `{}`{}\n", label.name, label.id, marker));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn task(id: i64, name: &str, status: TaskStatus) -> Task {
        Task {
            id,
            name: name.to_string(),
            full_name: None,
            create_date: Some("2024-03-04".to_string()),
            description: None,
            labels: String::new(),
            folder_path: format!("/work/{}", name),
            create_time: 0,
            ddl_time: None,
            finish_time: None,
            status,
            importance: Importance::Normal,
        }
    }

    #[test]
    fn tasks_grouped_by_status() {
        let md = format_tasks_markdown(&[
            task(1, "done-one", TaskStatus::Done),
            task(2, "open-one", TaskStatus::Open),
        ]);
        assert!(md.starts_with("# Tasks (2)"));
        let open = md.find("## Open").unwrap();
        let done = md.find("## Done").unwrap();
        assert!(open < done);
        assert!(md.contains("- open-one `2` (2024-03-04)"));
    }

    #[test]
    fn descriptors_grouped_by_root() {
        let md = format_descriptors_markdown(&[TaskFolderDescriptor {
            title: "Report".to_string(),
            date: "2024-03-04".to_string(),
            sequence_number: 1,
            folder_path: PathBuf::from("/work/2024-03-04_01_Report"),
            root_path: PathBuf::from("/work"),
        }]);
        assert!(md.contains("## /work"));
        assert!(md.contains("- 2024-03-04 #01 Report"));
    }
}
