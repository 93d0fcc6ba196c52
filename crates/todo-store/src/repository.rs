//! Transactional task repository.
//!
//! [`TaskRepository`] owns the connection pool. Every method checks out one
//! connection and runs inside exactly one transaction: it commits on success,
//! and any error drops the transaction, which rolls it back.

use std::collections::HashMap;
use std::fmt;

use rusqlite::{Connection, Params, Row, params, params_from_iter};
use todo_core::Task;
use tracing::{debug, instrument};

use crate::connection::{self, ConnectionConfig, ConnectionPool, PooledConnection};
use crate::error::Result;
use crate::pagination::offset;
use crate::query::SearchQuery;
use crate::schema;

/// Path that selects a private in-memory database instead of a file.
pub const IN_MEMORY_PATH: &str = ":memory:";

const SELECT_BY_ID: &str = "SELECT * FROM tasks WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM tasks";
const SELECT_PAGE: &str = "SELECT * FROM tasks LIMIT ? OFFSET ?";
const INSERT: &str =
    "INSERT INTO tasks (title, description, addedOn, dueBy, status) VALUES (?, ?, ?, ?, ?)";
const UPDATE: &str =
    "UPDATE tasks SET title = ?, description = ?, addedOn = ?, dueBy = ?, status = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM tasks WHERE id = ?";

/// `get_all` sentinel meaning "no pagination".
pub const ALL: i64 = -1;

/// Task persistence over a shared `SQLite` pool.
#[derive(Clone)]
pub struct TaskRepository {
    pool: ConnectionPool,
}

impl fmt::Debug for TaskRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRepository")
            .field("pool_size", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

impl TaskRepository {
    /// Wrap an existing pool, creating the `tasks` table if needed.
    pub fn new(pool: ConnectionPool) -> Result<Self> {
        let repo = Self { pool };
        let conn = repo.conn()?;
        schema::ensure_schema(&conn)?;
        drop(conn);
        Ok(repo)
    }

    /// Open the database at `path` (or [`IN_MEMORY_PATH`]).
    pub fn open(path: &str, config: &ConnectionConfig) -> Result<Self> {
        let pool = if path == IN_MEMORY_PATH {
            connection::new_in_memory(config)?
        } else {
            connection::new_file(path, config)?
        };
        let repo = Self::new(pool)?;
        let conn = repo.conn()?;
        let journal = connection::journal_mode(&conn)?;
        drop(conn);
        debug!(path, pool_size = repo.pool.max_size(), %journal, "opened task database");
        Ok(repo)
    }

    /// Fresh private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::new(connection::new_in_memory(&ConnectionConfig::default())?)
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Task with primary key `id`: zero or one element.
    #[instrument(skip(self))]
    pub fn get_by_id(&self, id: i64) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let tasks = query_tasks(&tx, SELECT_BY_ID, [id])?;
        tx.commit()?;
        Ok(tasks)
    }

    /// One page of tasks, or all of them when either argument is [`ALL`].
    ///
    /// Values are used as given; callers normalize them first.
    #[instrument(skip(self))]
    pub fn get_all(&self, page: i64, per_page: i64) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let tasks = if page == ALL || per_page == ALL {
            query_tasks(&tx, SELECT_ALL, [])?
        } else {
            query_tasks(&tx, SELECT_PAGE, [per_page, offset(page, per_page)])?
        };
        tx.commit()?;
        Ok(tasks)
    }

    /// Insert `task` and return the generated id. `task.id` is ignored.
    #[instrument(skip(self, task), fields(title = %task.title))]
    pub fn create(&self, task: &Task) -> Result<i64> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let _ = tx.execute(
            INSERT,
            params![
                task.title,
                task.description,
                task.added_on,
                task.due_by,
                task.status
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        debug!(id, "created task");
        Ok(id)
    }

    /// Replace every field except the id of row `id`.
    ///
    /// Updating a row that does not exist is not an error.
    #[instrument(skip(self, task))]
    pub fn update(&self, task: &Task, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let updated = tx.execute(
            UPDATE,
            params![
                task.title,
                task.description,
                task.added_on,
                task.due_by,
                task.status,
                id
            ],
        )?;
        tx.commit()?;
        debug!(updated, "updated task");
        Ok(())
    }

    /// Delete row `id`, returning the number of rows removed (`0` or `1`).
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let deleted = tx.execute(DELETE, [id])?;
        tx.commit()?;
        Ok(deleted)
    }

    /// Tasks matching every filter of `query`, one page at a time.
    ///
    /// Results are unordered.
    #[instrument(skip(self, query))]
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Task>> {
        let built = query.build();
        debug!(sql = %built.sql, params = ?built.params, "search");

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let tasks = query_tasks(&tx, &built.sql, params_from_iter(built.params.iter()))?;
        tx.commit()?;
        Ok(tasks)
    }

    /// [`search`](Self::search) from the raw string parameters.
    pub fn search_map(&self, params: &HashMap<String, String>) -> Result<Vec<Task>> {
        self.search(&SearchQuery::from_params(params)?)
    }
}

fn query_tasks<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let tasks = stmt
        .query_map(params, task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        added_on: row.get("addedOn")?,
        due_by: row.get("dueBy")?,
        status: row.get("status")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::error::StoreError;
    use crate::query::Filter;

    fn setup() -> TaskRepository {
        TaskRepository::in_memory().unwrap()
    }

    fn sample(n: i64) -> Task {
        Task::new(
            format!("task {n}"),
            format!("description {n}"),
            "open",
            1_700_000_000_000 + n,
            1_800_000_000_000 + n,
        )
    }

    fn seed(repo: &TaskRepository, count: i64) -> Vec<i64> {
        (0..count).map(|n| repo.create(&sample(n)).unwrap()).collect()
    }

    fn insert_with_id(repo: &TaskRepository, id: i64, status: &str) {
        let conn = repo.conn().unwrap();
        let _ = conn
            .execute(
                "INSERT INTO tasks (id, title, description, addedOn, dueBy, status) VALUES (?, 't', 'd', 1, 2, ?)",
                params![id, status],
            )
            .unwrap();
    }

    fn count(repo: &TaskRepository) -> i64 {
        repo.conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap()
    }

    fn ids(tasks: &[Task]) -> HashSet<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    // ── get_by_id / create ─────────────────────────────────────────

    #[test]
    fn create_then_get_round_trips() {
        let repo = setup();
        let task = sample(1);
        let id = repo.create(&task).unwrap();
        assert!(id > 0);

        let found = repo.get_by_id(id).unwrap();
        assert_eq!(found, vec![task.with_id(id)]);
    }

    #[test]
    fn create_ignores_supplied_id() {
        let repo = setup();
        let id = repo.create(&sample(1).with_id(999)).unwrap();
        assert_ne!(id, 999);
        assert!(repo.get_by_id(999).unwrap().is_empty());
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let repo = setup();
        let ids = seed(&repo, 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn missing_id_is_empty() {
        let repo = setup();
        assert!(repo.get_by_id(42).unwrap().is_empty());
    }

    // ── get_all ────────────────────────────────────────────────────

    #[test]
    fn get_all_pages() {
        let repo = setup();
        let _ = seed(&repo, 25);

        assert_eq!(repo.get_all(0, 10).unwrap().len(), 10);
        assert_eq!(repo.get_all(1, 10).unwrap().len(), 10);
        assert_eq!(repo.get_all(2, 10).unwrap().len(), 5);
        assert!(repo.get_all(3, 10).unwrap().is_empty());

        let mut seen = HashSet::new();
        for page in 0..3 {
            seen.extend(ids(&repo.get_all(page, 10).unwrap()));
        }
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn get_all_unpaginated() {
        let repo = setup();
        let _ = seed(&repo, 15);
        assert_eq!(repo.get_all(ALL, ALL).unwrap().len(), 15);
        assert_eq!(repo.get_all(ALL, 5).unwrap().len(), 15);
        assert_eq!(repo.get_all(2, ALL).unwrap().len(), 15);
    }

    #[test]
    fn get_all_empty_table() {
        let repo = setup();
        assert!(repo.get_all(0, 10).unwrap().is_empty());
        assert!(repo.get_all(ALL, ALL).unwrap().is_empty());
    }

    // ── update ─────────────────────────────────────────────────────

    #[test]
    fn update_replaces_fields() {
        let repo = setup();
        let id = repo.create(&sample(1)).unwrap();
        let changed = Task::new("renamed", "new text", "done", 5, 6);

        repo.update(&changed, id).unwrap();

        assert_eq!(repo.get_by_id(id).unwrap(), vec![changed.with_id(id)]);
    }

    #[test]
    fn update_missing_row_is_ok() {
        let repo = setup();
        repo.update(&sample(1), 77).unwrap();
        assert_eq!(count(&repo), 0);
    }

    // ── delete ─────────────────────────────────────────────────────

    #[test]
    fn delete_reports_rows() {
        let repo = setup();
        let id = repo.create(&sample(1)).unwrap();

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert_eq!(repo.delete(id).unwrap(), 0);
        assert!(repo.get_by_id(id).unwrap().is_empty());
    }

    // ── failures roll back ─────────────────────────────────────────

    #[test]
    fn failed_delete_is_an_error_and_keeps_row() {
        let repo = setup();
        let id = repo.create(&sample(1)).unwrap();
        repo.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER no_delete BEFORE DELETE ON tasks BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        let result = repo.delete(id);
        assert_matches!(result, Err(StoreError::Sqlite(_)));
        assert_eq!(repo.get_by_id(id).unwrap().len(), 1);
    }

    #[test]
    fn failed_create_leaves_no_row() {
        let repo = setup();
        repo.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER no_insert AFTER INSERT ON tasks BEGIN SELECT RAISE(ABORT, 'read only'); END;",
            )
            .unwrap();

        assert_matches!(repo.create(&sample(1)), Err(StoreError::Sqlite(_)));
        assert_eq!(count(&repo), 0);
    }

    #[test]
    fn failed_update_keeps_old_values() {
        let repo = setup();
        let original = sample(1);
        let id = repo.create(&original).unwrap();
        repo.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER no_update BEFORE UPDATE ON tasks BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
            )
            .unwrap();

        assert!(repo.update(&sample(2), id).is_err());
        assert_eq!(repo.get_by_id(id).unwrap(), vec![original.with_id(id)]);
    }

    // ── search ─────────────────────────────────────────────────────

    #[test]
    fn search_by_status() {
        let repo = setup();
        insert_with_id(&repo, 8, "done");
        insert_with_id(&repo, 9, "done");
        insert_with_id(&repo, 10, "open");

        let found = repo.search_map(&map(&[("status", "done")])).unwrap();
        assert_eq!(ids(&found), HashSet::from([8, 9]));
    }

    #[test]
    fn search_empty_table() {
        let repo = setup();
        assert!(repo.search_map(&HashMap::new()).unwrap().is_empty());
        assert!(repo.search(&SearchQuery::new()).unwrap().is_empty());
    }

    #[test]
    fn search_by_id() {
        let repo = setup();
        let created = seed(&repo, 3);
        let found = repo
            .search(&SearchQuery::new().filter(Filter::Id(created[1])))
            .unwrap();
        assert_eq!(ids(&found), HashSet::from([created[1]]));
    }

    #[test]
    fn search_date_ranges_are_inclusive() {
        let repo = setup();
        for (added_on, due_by) in [(10, 100), (20, 200), (30, 300)] {
            let _ = repo
                .create(&Task::new("t", "d", "open", added_on, due_by))
                .unwrap();
        }

        let found = repo
            .search_map(&map(&[("addedOnFrom", "10"), ("addedOnTo", "20")]))
            .unwrap();
        let added: HashSet<i64> = found.iter().map(|t| t.added_on).collect();
        assert_eq!(added, HashSet::from([10, 20]));

        let found = repo
            .search_map(&map(&[("dueByFrom", "200"), ("dueByTo", "9999999999999")]))
            .unwrap();
        let due: HashSet<i64> = found.iter().map(|t| t.due_by).collect();
        assert_eq!(due, HashSet::from([200, 300]));
    }

    #[test]
    fn search_is_paginated() {
        let repo = setup();
        let _ = seed(&repo, 12);

        assert_eq!(repo.search_map(&HashMap::new()).unwrap().len(), 10);
        assert_eq!(repo.search_map(&map(&[("page", "1")])).unwrap().len(), 2);
        assert_eq!(
            repo.search_map(&map(&[("perPage", "5"), ("page", "2")]))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn search_rejects_bad_number() {
        let repo = setup();
        assert_matches!(
            repo.search_map(&map(&[("id", "abc")])),
            Err(StoreError::InvalidFilter { .. })
        );
    }

    // ── pool ───────────────────────────────────────────────────────

    #[test]
    fn open_file_persists_across_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let path = path.to_str().unwrap();

        let id = TaskRepository::open(path, &ConnectionConfig::default())
            .unwrap()
            .create(&sample(1))
            .unwrap();

        let reopened = TaskRepository::open(path, &ConnectionConfig::default()).unwrap();
        assert_eq!(reopened.get_by_id(id).unwrap().len(), 1);
    }

    #[test]
    fn open_memory_path() {
        let repo = TaskRepository::open(IN_MEMORY_PATH, &ConnectionConfig::default()).unwrap();
        assert_eq!(repo.pool().max_size(), 1);
        let _ = seed(&repo, 2);
        assert_eq!(repo.get_all(ALL, ALL).unwrap().len(), 2);
    }

    #[test]
    fn debug_output_shows_pool_size() {
        let repo = setup();
        let rendered = format!("{repo:?}");
        assert!(rendered.starts_with("TaskRepository"), "got: {rendered}");
        assert!(rendered.contains("pool_size: 1"), "got: {rendered}");
    }

    #[test]
    fn open_under_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("tasks.db");

        let err = TaskRepository::open(path.to_str().unwrap(), &ConnectionConfig::default())
            .unwrap_err();
        assert_matches!(err, StoreError::Io(_));
    }

    #[test]
    fn concurrent_readers_share_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let config = ConnectionConfig {
            pool_size: 4,
            busy_timeout_ms: 5_000,
        };
        let repo = Arc::new(TaskRepository::open(path.to_str().unwrap(), &config).unwrap());
        let _ = seed(&repo, 20);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || {
                    let all = repo.get_all(ALL, ALL).unwrap();
                    let page = repo.get_all(i % 2, 10).unwrap();
                    (all.len(), page.len())
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), (20, 10));
        }
    }
}
