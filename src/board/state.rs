//! Task list reconciliation.
//!
//! The visible list is the last authoritative fetch with two local overlays:
//! tasks hidden while their deletion is pending, and temporary clone records
//! shown before the server confirms them.

use crate::types::Task;
use std::collections::HashMap;

/// Prefix marking locally generated, not-yet-confirmed records.
pub const TEMP_ID_PREFIX: &str = "temp-";

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

pub fn temporary_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4())
}

/// Authoritative list plus optimistic overlays.
#[derive(Debug, Clone, Default)]
pub struct TaskListState {
    authoritative: Vec<Task>,
    /// Hidden task id -> revision of the record when it was hidden.
    pending_deletes: HashMap<String, i64>,
    /// Temporary records, most recent first.
    pending_clones: Vec<Task>,
}

impl TaskListState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            authoritative: tasks,
            ..Default::default()
        }
    }

    /// Last list fetched from the store.
    pub fn authoritative(&self) -> &[Task] {
        &self.authoritative
    }

    /// Pending clones first, then authoritative tasks minus hidden ones.
    pub fn visible(&self) -> Vec<&Task> {
        self.pending_clones
            .iter()
            .chain(
                self.authoritative
                    .iter()
                    .filter(|t| !self.pending_deletes.contains_key(&t.id)),
            )
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible().into_iter().map(|t| t.id.as_str()).collect()
    }

    /// Find a task in the authoritative list.
    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.authoritative.iter().find(|t| t.id == task_id)
    }

    /// Hide an authoritative task. Returns false if it is not in the list.
    pub fn hide(&mut self, task_id: &str) -> bool {
        let Some(revision) = self.find(task_id).map(|t| t.revision) else {
            return false;
        };
        self.pending_deletes.insert(task_id.to_string(), revision);
        true
    }

    /// Stop hiding a task. Returns true if it was hidden.
    pub fn unhide(&mut self, task_id: &str) -> bool {
        self.pending_deletes.remove(task_id).is_some()
    }

    pub fn is_hidden(&self, task_id: &str) -> bool {
        self.pending_deletes.contains_key(task_id)
    }

    pub fn pending_delete_count(&self) -> usize {
        self.pending_deletes.len()
    }

    /// Put a confirmed record into the authoritative list and stop hiding it.
    ///
    /// An existing entry is replaced in place; a new one goes first, since
    /// the store has just touched it.
    pub fn upsert(&mut self, task: Task) {
        self.pending_deletes.remove(&task.id);
        match self.authoritative.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.authoritative.insert(0, task),
        }
    }

    /// Drop a record from the authoritative list. Returns true if it was present.
    pub fn remove(&mut self, task_id: &str) -> bool {
        self.pending_deletes.remove(task_id);
        let before = self.authoritative.len();
        self.authoritative.retain(|t| t.id != task_id);
        self.authoritative.len() != before
    }

    /// Prepend a temporary clone record.
    pub fn push_clone(&mut self, task: Task) {
        self.pending_clones.insert(0, task);
    }

    /// Drop a temporary clone record. Returns true if it was present.
    pub fn remove_clone(&mut self, temp_id: &str) -> bool {
        let before = self.pending_clones.len();
        self.pending_clones.retain(|t| t.id != temp_id);
        self.pending_clones.len() != before
    }

    pub fn pending_clones(&self) -> &[Task] {
        &self.pending_clones
    }

    /// Replace the authoritative list and reconcile overlays.
    ///
    /// A hidden id is released once it is absent (deletion confirmed) or
    /// once the store returns it at a newer revision than the one we hid
    /// (restored or edited since). Temporary clones are always cleared; the
    /// confirmed record is expected in the new list.
    pub fn refresh(&mut self, tasks: Vec<Task>) {
        let revisions: HashMap<&str, i64> =
            tasks.iter().map(|t| (t.id.as_str(), t.revision)).collect();
        self.pending_deletes
            .retain(|id, hidden_at| match revisions.get(id.as_str()) {
                Some(current) => current <= hidden_at,
                None => false,
            });
        self.pending_clones.clear();
        self.authoritative = tasks;
    }
}
