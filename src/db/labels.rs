//! Label storage. Labels are global and shared across users' tasks.

use super::{Database, new_id, now_ms};
use crate::error::AppError;
use crate::types::{Label, LabelWithCount};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;

pub(crate) fn parse_label_row(row: &Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}

/// Fail with a validation error if any id does not name an existing label.
pub(crate) fn ensure_labels_exist(conn: &Connection, label_ids: &[String]) -> Result<()> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM labels WHERE id = ?1")?;
    for id in label_ids {
        if !stmt.exists(params![id])? {
            return Err(AppError::label_not_found(id).into());
        }
    }
    Ok(())
}

/// Labels for each of the given tasks, keyed by task id, ordered by name.
pub(crate) fn labels_for_tasks(
    conn: &Connection,
    task_ids: &[&str],
) -> Result<HashMap<String, Vec<Label>>> {
    let mut out: HashMap<String, Vec<Label>> = HashMap::new();
    let mut stmt = conn.prepare_cached(
        "SELECT l.id, l.name, l.color, l.created_at
         FROM task_labels tl JOIN labels l ON l.id = tl.label_id
         WHERE tl.task_id = ?1
         ORDER BY l.name",
    )?;
    for task_id in task_ids {
        let labels = stmt
            .query_map(params![task_id], parse_label_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.insert((*task_id).to_string(), labels);
    }
    Ok(out)
}

impl Database {
    /// Create a label. The name must already be normalised.
    pub fn create_label(&self, name: &str, color: &str) -> Result<Label> {
        let label = Label {
            id: new_id(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: now_ms(),
        };

        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM labels WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(AppError::already_exists("Label already exists")
                    .with_field("name")
                    .into());
            }

            conn.execute(
                "INSERT INTO labels (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![&label.id, &label.name, &label.color, label.created_at],
            )?;
            Ok(())
        })?;

        Ok(label)
    }

    /// Get a label by id.
    pub fn get_label(&self, label_id: &str) -> Result<Option<Label>> {
        self.with_conn(|conn| {
            let label = conn
                .query_row(
                    "SELECT id, name, color, created_at FROM labels WHERE id = ?1",
                    params![label_id],
                    parse_label_row,
                )
                .optional()?;
            Ok(label)
        })
    }

    /// All labels ordered by name, with the count of live tasks using each.
    pub fn list_labels(&self) -> Result<Vec<LabelWithCount>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.name, l.color, l.created_at,
                        COUNT(t.id) AS task_count
                 FROM labels l
                 LEFT JOIN task_labels tl ON tl.label_id = l.id
                 LEFT JOIN tasks t ON t.id = tl.task_id AND t.deleted_at IS NULL
                 GROUP BY l.id
                 ORDER BY l.name ASC",
            )?;
            let labels = stmt
                .query_map([], |row| {
                    Ok(LabelWithCount {
                        label: parse_label_row(row)?,
                        task_count: row.get("task_count")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(labels)
        })
    }
}
