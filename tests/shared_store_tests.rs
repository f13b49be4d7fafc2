//! The process-wide store is opened once; later requests share it.
//!
//! Kept in its own test binary so no other test touches the shared store.

use task_folders::db;
use task_folders::types::NewTask;
use tempfile::TempDir;

#[test]
fn shared_store_returns_the_same_instance() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tasks.db");

    let first = db::shared(&path).expect("Failed to open shared store");
    let second = db::shared(&path).expect("Failed to reopen shared store");
    assert!(first.shares_connection_with(&second));

    let id = first.insert_task(&NewTask::new("Report", "/work/report")).unwrap();
    let seen = second.get_task(id).unwrap().expect("Task visible from second handle");
    assert_eq!(seen.name, "Report");

    // A different path still yields the already-open store.
    let other = db::shared(temp.path().join("other.db")).unwrap();
    assert!(other.shares_connection_with(&first));
    assert!(!temp.path().join("other.db").exists());
}
