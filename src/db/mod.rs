//! Database layer for the task folder catalog.

pub mod folder_tasks;
pub mod folders;
pub mod labels;
pub mod schema;
pub mod task_labels;
pub mod tasks;

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
///
/// Clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("conn", &Arc::as_ptr(&self.conn))
            .finish()
    }
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        debug!(path = %path.display(), "Opened task store");
        Self::init(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        // Tables created by an older field set are never altered in place.
        schema::check_existing_tables(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let report = embedded::migrations::runner().run(&mut *conn)?;
        for m in report.applied_migrations() {
            debug!(version = m.version(), name = m.name(), "Applied migration");
        }
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::database("connection lock poisoned"))
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        let mut conn = self.lock()?;
        f(&mut conn)
    }

    /// Whether both handles point at the same underlying connection.
    pub fn shares_connection_with(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.conn, &other.conn)
    }
}

/// One-time holder for a shared [`Database`].
///
/// The first successful open wins; later and concurrent callers get a clone
/// of the same handle. The lock is held while opening so that exactly one
/// caller performs the initialization.
pub struct StoreRegistry {
    slot: Mutex<Option<(Option<PathBuf>, Database)>>,
}

impl StoreRegistry {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the registered store, opening it at `path` on first use.
    ///
    /// A later request for a different path still returns the existing store.
    pub fn get_or_open<P: AsRef<Path>>(&self, path: P) -> StoreResult<Database> {
        let path = path.as_ref();
        let mut slot = self.lock_slot()?;
        if let Some((opened_at, db)) = slot.as_ref() {
            if opened_at.as_deref() != Some(path) {
                warn!(
                    requested = %path.display(),
                    opened = ?opened_at,
                    "Task store already open; returning existing handle"
                );
            }
            return Ok(db.clone());
        }

        let db = Database::open(path)?;
        *slot = Some((Some(path.to_path_buf()), db.clone()));
        Ok(db)
    }

    /// Return the registered store, creating it with `open` on first use.
    pub fn get_or_init_with<F>(&self, open: F) -> StoreResult<Database>
    where
        F: FnOnce() -> StoreResult<Database>,
    {
        let mut slot = self.lock_slot()?;
        if let Some((_, db)) = slot.as_ref() {
            return Ok(db.clone());
        }

        let db = open()?;
        *slot = Some((None, db.clone()));
        Ok(db)
    }

    /// The registered store, if one has been opened.
    pub fn get(&self) -> Option<Database> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, db)| db.clone()))
    }

    fn lock_slot(&self) -> StoreResult<MutexGuard<'_, Option<(Option<PathBuf>, Database)>>> {
        self.slot
            .lock()
            .map_err(|_| StoreError::database("store registry lock poisoned"))
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static PROCESS_STORE: StoreRegistry = StoreRegistry::new();

/// The process-wide store. The first call opens `path`; every later call
/// returns a handle to that same store.
pub fn shared<P: AsRef<Path>>(path: P) -> StoreResult<Database> {
    PROCESS_STORE.get_or_open(path)
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Map `QueryReturnedNoRows` to `None`.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> StoreResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn registry_opens_once() {
        let registry = StoreRegistry::new();
        assert!(registry.get().is_none());

        let a = registry.get_or_init_with(Database::open_in_memory).unwrap();
        let b = registry
            .get_or_init_with(|| panic!("second init must not run"))
            .unwrap();

        assert!(a.shares_connection_with(&b));
        assert!(registry.get().unwrap().shares_connection_with(&a));
    }

    #[test]
    fn concurrent_init_picks_one_winner() {
        let registry = Arc::new(StoreRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get_or_init_with(Database::open_in_memory).unwrap())
            })
            .collect();

        let dbs: Vec<Database> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for db in &dbs[1..] {
            assert!(db.shares_connection_with(&dbs[0]));
        }
    }

    #[test]
    fn failed_init_leaves_registry_empty() {
        let registry = StoreRegistry::new();
        let err = registry
            .get_or_init_with(|| Err(StoreError::database("boom")))
            .unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(registry.get().is_none());
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let on: i64 = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(on, 1);
    }
}
