//! Task store trait and `SQLite` implementation.

use crate::error::Result;
use crate::tasks::models::Task;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Trait for task storage operations.
///
/// All methods return a `Result` and may fail with database errors.
#[allow(clippy::missing_errors_doc)]
pub trait TaskStore {
    /// Append a new task, letting the store assign a fresh id.
    ///
    /// The row is persisted immediately; the returned record carries the
    /// assigned id.
    fn insert(&self, user: &str, date: &str, task: &str) -> Result<Task>;

    /// All tasks whose `user` exactly equals the argument, in storage order.
    fn query_by_user(&self, user: &str) -> Result<Vec<Task>>;

    /// The user's first task in storage order, or `None` if they have none.
    fn first_by_user(&self, user: &str) -> Result<Option<Task>>;

    /// Delete the task with the given id.
    ///
    /// Returns `Ok(false)` when no such row exists; a missing id is a no-op,
    /// not an error.
    fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Mark the task with the given id as completed.
    ///
    /// Returns `Ok(false)` when no such row exists.
    fn complete_by_id(&self, id: i64) -> Result<bool>;

    /// Number of stored tasks belonging to the user.
    fn count_by_user(&self, user: &str) -> Result<usize>;
}

/// SQLite-based task store.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
    degraded: bool,
}

impl SqliteTaskStore {
    /// Create a new `SQLite` task store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf(), degraded: false };
        store.init_schema()?;
        Ok(store)
    }

    /// Open the store at the given path, creating the database and schema on
    /// first use.
    ///
    /// Never fails: a setup error is logged and the returned handle is
    /// flagged degraded instead, so startup is never blocked. Operations on
    /// a degraded handle surface their own errors.
    #[must_use]
    pub fn open_or_create(db_path: impl AsRef<Path>) -> Self {
        let path = db_path.as_ref().to_path_buf();
        match Self::new(&path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Error in database management: {e}");
                Self { db_path: path, degraded: true }
            }
        }
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Whether schema setup failed when this handle was opened.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasklist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                user TEXT NOT NULL CHECK (length(user) <= 60),
                task TEXT NOT NULL CHECK (length(task) <= 150),
                completed INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_tasklist_user ON tasklist(user);
            ",
        )?;

        Ok(())
    }

    /// Parse a task from a row.
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            date: row.get(1)?,
            user: row.get(2)?,
            task: row.get(3)?,
            completed: row.get(4)?,
        })
    }
}

impl TaskStore for SqliteTaskStore {
    fn insert(&self, user: &str, date: &str, task: &str) -> Result<Task> {
        let conn = self.open()?;

        conn.execute(
            "INSERT INTO tasklist (date, user, task, completed) VALUES (?1, ?2, ?3, 0)",
            params![date, user, task],
        )?;
        let id = conn.last_insert_rowid();

        let task = conn.query_row(
            "SELECT id, date, user, task, completed FROM tasklist WHERE id = ?1",
            params![id],
            Self::parse_task,
        )?;

        Ok(task)
    }

    fn query_by_user(&self, user: &str) -> Result<Vec<Task>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT id, date, user, task, completed FROM tasklist WHERE user = ?1")?;
        let tasks = stmt.query_map(params![user], Self::parse_task)?.flatten().collect();
        Ok(tasks)
    }

    fn first_by_user(&self, user: &str) -> Result<Option<Task>> {
        let conn = self.open()?;
        let task = conn
            .query_row(
                "SELECT id, date, user, task, completed FROM tasklist WHERE user = ?1 LIMIT 1",
                params![user],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn delete_by_id(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasklist WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn complete_by_id(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("UPDATE tasklist SET completed = 1 WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_by_user(&self, user: &str) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasklist WHERE user = ?1",
            params![user],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteTaskStore) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteTaskStore::new(&db_path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_and_query_round_trip() {
        let (_dir, store) = create_test_store();

        let task = store.insert("Alice", "2026-08-03T21:15:00+00:00", "buy milk").unwrap();
        assert!(task.id > 0);
        assert_eq!(task.user, "Alice");
        assert_eq!(task.task, "buy milk");
        assert!(!task.completed);

        let tasks = store.query_by_user("Alice").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task, "buy milk");
        assert_eq!(tasks[0].date, "2026-08-03T21:15:00+00:00");
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let (_dir, store) = create_test_store();

        let first = store.insert("Alice", "2026-01-01T00:00:00+00:00", "one").unwrap();
        let second = store.insert("Alice", "2026-01-01T00:00:00+00:00", "two").unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_query_matches_user_exactly() {
        let (_dir, store) = create_test_store();

        store.insert("Alice", "2026-01-01T00:00:00+00:00", "hers").unwrap();
        store.insert("Bob", "2026-01-01T00:00:00+00:00", "his").unwrap();

        let alice = store.query_by_user("Alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].task, "hers");

        // Case matters: the app title-cases once, the store never folds.
        assert!(store.query_by_user("alice").unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_only_that_row() {
        let (_dir, store) = create_test_store();

        let mine = store.insert("Alice", "2026-01-01T00:00:00+00:00", "Write report").unwrap();
        store.insert("Alice", "2026-01-01T00:00:00+00:00", "Call bank").unwrap();
        let theirs = store.insert("Bob", "2026-01-01T00:00:00+00:00", "Walk dog").unwrap();

        assert!(store.delete_by_id(mine.id).unwrap());

        let alice = store.query_by_user("Alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].task, "Call bank");

        let bob = store.query_by_user("Bob").unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].id, theirs.id);
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let (_dir, store) = create_test_store();

        store.insert("Alice", "2026-01-01T00:00:00+00:00", "keep me").unwrap();
        assert!(!store.delete_by_id(9999).unwrap());
        assert_eq!(store.count_by_user("Alice").unwrap(), 1);
    }

    #[test]
    fn test_first_by_user_empty_is_none() {
        let (_dir, store) = create_test_store();
        assert!(store.first_by_user("Alice").unwrap().is_none());
    }

    #[test]
    fn test_first_by_user_returns_earliest_recorded() {
        let (_dir, store) = create_test_store();

        let first = store.insert("Alice", "2026-01-01T00:00:00+00:00", "first").unwrap();
        store.insert("Alice", "2026-01-02T00:00:00+00:00", "second").unwrap();

        let nearest = store.first_by_user("Alice").unwrap().unwrap();
        assert_eq!(nearest.id, first.id);
        assert_eq!(nearest.task, "first");
    }

    #[test]
    fn test_complete_by_id_sets_flag_and_keeps_row() {
        let (_dir, store) = create_test_store();

        let task = store.insert("Alice", "2026-01-01T00:00:00+00:00", "finish taxes").unwrap();
        assert!(store.complete_by_id(task.id).unwrap());

        let tasks = store.query_by_user("Alice").unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);
    }

    #[test]
    fn test_complete_nonexistent_returns_false() {
        let (_dir, store) = create_test_store();
        assert!(!store.complete_by_id(42).unwrap());
    }

    #[test]
    fn test_count_by_user() {
        let (_dir, store) = create_test_store();

        assert_eq!(store.count_by_user("Alice").unwrap(), 0);
        store.insert("Alice", "2026-01-01T00:00:00+00:00", "a").unwrap();
        store.insert("Alice", "2026-01-01T00:00:00+00:00", "b").unwrap();
        store.insert("Bob", "2026-01-01T00:00:00+00:00", "c").unwrap();
        assert_eq!(store.count_by_user("Alice").unwrap(), 2);
        assert_eq!(store.count_by_user("Bob").unwrap(), 1);
    }

    #[test]
    fn test_open_or_create_reopens_existing_data() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");

        let store = SqliteTaskStore::open_or_create(&db_path);
        assert!(!store.is_degraded());
        store.insert("Alice", "2026-01-01T00:00:00+00:00", "persists").unwrap();
        drop(store);

        let reopened = SqliteTaskStore::open_or_create(&db_path);
        assert!(!reopened.is_degraded());
        let tasks = reopened.query_by_user("Alice").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task, "persists");
    }

    #[test]
    fn test_open_or_create_unusable_path_is_degraded_not_panic() {
        let dir = TempDir::new().unwrap();

        // A directory is not a valid database file.
        let store = SqliteTaskStore::open_or_create(dir.path());
        assert!(store.is_degraded());
        assert!(store.query_by_user("Alice").is_err());
    }
}
