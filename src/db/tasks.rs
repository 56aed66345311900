//! Task CRUD, soft-delete lifecycle, and cloning.
//!
//! Every statement is scoped by both task id and owning user id, so a task
//! owned by someone else is indistinguishable from a missing one.

use super::labels::{ensure_labels_exist, labels_for_tasks};
use super::{Database, new_id, now_ms};
use crate::types::{CreateTaskInput, Task, TaskFilter, UpdateTaskInput};
use anyhow::{Result, anyhow};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};


const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, due_date, \
                            deleted_at, revision, created_at, updated_at";

/// Parse a task row. Labels are attached separately.
pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: status.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
        })?,
        priority: priority.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?,
        due_date: row.get("due_date")?,
        deleted_at: row.get("deleted_at")?,
        revision: row.get("revision")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        labels: Vec::new(),
    })
}

/// Advance the store-wide write counter and return the new value.
///
/// Call inside the transaction of the write that stamps it.
fn next_revision(conn: &Connection) -> Result<i64> {
    let revision = conn.query_row(
        "UPDATE revision_counter SET value = value + 1 WHERE id = 1 RETURNING value",
        [],
        |row| row.get(0),
    )?;
    Ok(revision)
}

/// Fill in each task's labels.
fn attach_labels(conn: &Connection, tasks: &mut [Task]) -> Result<()> {
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut by_task = labels_for_tasks(conn, &ids)?;
    for task in tasks.iter_mut() {
        task.labels = by_task.remove(&task.id).unwrap_or_default();
    }
    Ok(())
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(
    conn: &Connection,
    user_id: &str,
    task_id: &str,
    include_deleted: bool,
) -> Result<Option<Task>> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2{}",
        TASK_COLUMNS,
        if include_deleted {
            ""
        } else {
            " AND deleted_at IS NULL"
        }
    );
    let task = conn
        .query_row(&sql, params![task_id, user_id], parse_task_row)
        .optional()?;

    match task {
        Some(task) => {
            let mut tasks = [task];
            attach_labels(conn, &mut tasks)?;
            let [task] = tasks;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

/// Replace the label set of a task.
fn sync_task_labels(conn: &Connection, task_id: &str, label_ids: &[String]) -> Result<()> {
    ensure_labels_exist(conn, label_ids)?;
    conn.execute("DELETE FROM task_labels WHERE task_id = ?1", params![task_id])?;
    let mut stmt =
        conn.prepare_cached("INSERT INTO task_labels (task_id, label_id) VALUES (?1, ?2)")?;
    for label_id in label_ids {
        stmt.execute(params![task_id, label_id])?;
    }
    Ok(())
}

impl Database {
    /// Create a task owned by `user_id`. Input must already be validated.
    pub fn create_task(&self, user_id: &str, input: &CreateTaskInput) -> Result<Task> {
        let task_id = new_id();
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let revision = next_revision(&tx)?;
            tx.execute(
                "INSERT INTO tasks (id, user_id, title, description, status, priority,
                                    due_date, deleted_at, revision, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?9, ?8, ?8)",
                params![
                    &task_id,
                    user_id,
                    &input.title,
                    &input.description,
                    input.status.unwrap_or_default().as_str(),
                    input.priority.unwrap_or_default().as_str(),
                    input.due_date,
                    now,
                    revision,
                ],
            )?;
            if !input.label_ids.is_empty() {
                sync_task_labels(&tx, &task_id, &input.label_ids)?;
            }
            let task = get_task_internal(&tx, user_id, &task_id, false)?
                .ok_or_else(|| anyhow!("task vanished after insert: {}", task_id))?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Get a live (not soft-deleted) task.
    pub fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, user_id, task_id, false))
    }

    /// Get a task regardless of its soft-delete state.
    ///
    /// Maintenance helper for inspecting the trash; request paths go through
    /// [`Database::get_task`], which hides deleted tasks.
    pub fn get_task_including_deleted(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, user_id, task_id, true))
    }

    /// List live tasks, most recently updated first.
    pub fn list_tasks(&self, user_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND deleted_at IS NULL",
            TASK_COLUMNS
        );
        let mut args: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if let Some(status) = filter.status {
            args.push(Value::Text(status.as_str().to_string()));
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(priority) = filter.priority {
            args.push(Value::Text(priority.as_str().to_string()));
            sql.push_str(&format!(" AND priority = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY updated_at DESC, revision DESC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut tasks = stmt
                .query_map(params_from_iter(args.iter()), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            attach_labels(conn, &mut tasks)?;
            Ok(tasks)
        })
    }

    /// Apply a partial update to a live task. Returns `None` if the task is
    /// missing, deleted, or owned by someone else.
    pub fn update_task(
        &self,
        user_id: &str,
        task_id: &str,
        input: &UpdateTaskInput,
    ) -> Result<Option<Task>> {
        let mut sets: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        let mut push = |column: &str, value: Value| {
            args.push(value);
            sets.push(format!("{} = ?{}", column, args.len()));
        };

        if let Some(title) = &input.title {
            push("title", Value::Text(title.clone()));
        }
        if let Some(description) = &input.description {
            push(
                "description",
                description.clone().map(Value::Text).unwrap_or(Value::Null),
            );
        }
        if let Some(status) = input.status {
            push("status", Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = input.priority {
            push("priority", Value::Text(priority.as_str().to_string()));
        }
        if let Some(due_date) = input.due_date {
            push("due_date", due_date.map(Value::Integer).unwrap_or(Value::Null));
        }
        push("updated_at", Value::Integer(now_ms()));
        // Filled in once the transaction is open
        push("revision", Value::Null);
        let revision_idx = args.len() - 1;

        args.push(Value::Text(task_id.to_string()));
        let id_idx = args.len();
        args.push(Value::Text(user_id.to_string()));
        let user_idx = args.len();

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ?{} AND user_id = ?{} AND deleted_at IS NULL",
            sets.join(", "),
            id_idx,
            user_idx
        );

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            args[revision_idx] = Value::Integer(next_revision(&tx)?);
            let updated = tx.execute(&sql, params_from_iter(args.iter()))?;
            if updated == 0 {
                return Ok(None);
            }
            if let Some(label_ids) = &input.label_ids {
                sync_task_labels(&tx, task_id, label_ids)?;
            }
            let task = get_task_internal(&tx, user_id, task_id, false)?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Mark a live task as deleted. Returns false if there was nothing to delete.
    pub fn soft_delete_task(&self, user_id: &str, task_id: &str) -> Result<bool> {
        let now = now_ms();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let revision = next_revision(&tx)?;
            let updated = tx.execute(
                "UPDATE tasks SET deleted_at = ?1, updated_at = ?1, revision = ?2
                 WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
                params![now, revision, task_id, user_id],
            )?;
            if updated == 0 {
                return Ok(false);
            }
            tx.commit()?;
            Ok(true)
        })
    }

    /// Clear the soft-delete mark. Restoring a live task is a no-op that
    /// still returns it.
    pub fn restore_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        let now = now_ms();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let revision = next_revision(&tx)?;
            let restored = tx.execute(
                "UPDATE tasks SET deleted_at = NULL, updated_at = ?1, revision = ?2
                 WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NOT NULL",
                params![now, revision, task_id, user_id],
            )?;
            let task = get_task_internal(&tx, user_id, task_id, false)?;
            if restored > 0 {
                tx.commit()?;
            }
            Ok(task)
        })
    }

    /// Permanently remove a task in any state. Label links cascade.
    pub fn hard_delete_task(&self, user_id: &str, task_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![task_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Copy a live task (fields and labels) into a new task with fresh
    /// identity and timestamps.
    pub fn clone_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        let new_task_id = new_id();
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let revision = next_revision(&tx)?;
            let inserted = tx.execute(
                "INSERT INTO tasks (id, user_id, title, description, status, priority,
                                    due_date, deleted_at, revision, created_at, updated_at)
                 SELECT ?1, user_id, title, description, status, priority,
                        due_date, NULL, ?5, ?2, ?2
                 FROM tasks WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
                params![&new_task_id, now, task_id, user_id, revision],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            tx.execute(
                "INSERT INTO task_labels (task_id, label_id)
                 SELECT ?1, label_id FROM task_labels WHERE task_id = ?2",
                params![&new_task_id, task_id],
            )?;
            let task = get_task_internal(&tx, user_id, &new_task_id, false)?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Permanently remove every task soft-deleted strictly before `cutoff`,
    /// across all users.
    pub fn purge_deleted_before(&self, cutoff: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE deleted_at IS NOT NULL AND deleted_at < ?1",
                params![cutoff],
            )?;
            Ok(deleted)
        })
    }

    /// Overwrite the soft-delete timestamp of a task without touching its
    /// revision.
    ///
    /// Maintenance helper for backdating deletions ahead of a retention sweep.
    /// Not reachable from any request path.
    #[doc(hidden)]
    pub fn set_deleted_at(&self, task_id: &str, deleted_at: Option<i64>) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET deleted_at = ?1 WHERE id = ?2",
                params![deleted_at, task_id],
            )?;
            Ok(updated > 0)
        })
    }
}
