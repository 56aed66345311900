//! Short-lived undo bookkeeping.

use super::notify::NotificationId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Identifies an undoable operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UndoKey {
    /// Deletion of the given task.
    Delete(String),
    /// Clone that produced the given task.
    Clone(String),
}

/// What undoing performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    Restore { task_id: String, title: String },
    HardDelete { cloned_id: String, source_id: String },
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub notification: NotificationId,
    pub action: UndoAction,
    pub expires_at: Instant,
}

impl UndoEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Maps operations to their armed undo actions.
#[derive(Debug)]
pub struct UndoCoordinator {
    entries: HashMap<UndoKey, UndoEntry>,
    timeout: Duration,
}

impl UndoCoordinator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arm an undo action from now. Returns the entry it replaced, if any.
    pub fn arm(
        &mut self,
        key: UndoKey,
        notification: NotificationId,
        action: UndoAction,
    ) -> Option<UndoEntry> {
        let entry = UndoEntry {
            notification,
            action,
            expires_at: Instant::now() + self.timeout,
        };
        self.entries.insert(key, entry)
    }

    /// Consume the action for `key` if it is still within its window.
    /// An expired entry is dropped and yields `None`.
    pub fn take(&mut self, key: &UndoKey) -> Option<UndoEntry> {
        let entry = self.entries.remove(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry)
    }

    /// Remove an entry regardless of expiry.
    pub fn remove(&mut self, key: &UndoKey) -> Option<UndoEntry> {
        self.entries.remove(key)
    }

    pub fn is_armed(&self, key: &UndoKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| !e.is_expired(Instant::now()))
    }

    /// Forget whatever entry is tied to a dismissed notification.
    pub fn forget_notification(&mut self, notification: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.notification != notification);
        self.entries.len() != before
    }

    /// Drop expired entries, returning how many were removed.
    pub fn prune(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
