//! Optimistic delete and clone with undo.
//!
//! Each operation is split into a synchronous `begin_*` phase that updates
//! the visible list immediately and a `finish_*` phase that applies the
//! remote result. The async wrappers run both around the [`TaskApi`] call and
//! re-fetch the list after every successful write.

use super::api::TaskApi;
use super::notify::{NotificationId, NotificationRequest, Notifier};
use super::state::{TaskListState, is_temporary_id, temporary_id};
use super::undo::{UndoAction, UndoCoordinator, UndoKey};
use crate::db::now_ms;
use crate::error::{AppError, AppResult};
use crate::types::{Task, TaskFilter};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const UNDO_LABEL: &str = "Undo";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Task {0} is not in the current list")]
    UnknownTask(String),
    #[error("Task {0} has not been confirmed yet")]
    Unconfirmed(String),
}

/// Token carried from `begin_delete` to `finish_delete`.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub task_id: String,
    pub title: String,
}

/// Token carried from `begin_clone` to `finish_clone`.
#[derive(Debug, Clone)]
pub struct PendingClone {
    pub source_id: String,
    pub temp_id: String,
    pub title: String,
}

#[derive(Debug)]
pub enum UndoOutcome {
    /// The reversing call succeeded.
    Reverted,
    /// The reversing call failed; an error notification was shown.
    Failed(AppError),
    /// Nothing armed for this key, or its window has passed.
    Unavailable,
}

/// Owns the task list view, undo state and notifier for one board.
pub struct BoardController<A, N> {
    api: A,
    notifier: N,
    state: TaskListState,
    undo: UndoCoordinator,
    filter: TaskFilter,
}

impl<A: TaskApi, N: Notifier> BoardController<A, N> {
    pub fn new(api: A, notifier: N, undo_timeout: Duration) -> Self {
        Self {
            api,
            notifier,
            state: TaskListState::default(),
            undo: UndoCoordinator::new(undo_timeout),
            filter: TaskFilter::default(),
        }
    }

    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.state.visible()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn undo_available(&self, key: &UndoKey) -> bool {
        self.undo.is_armed(key)
    }

    /// Apply a freshly fetched authoritative list.
    pub fn refresh(&mut self, tasks: Vec<Task>) {
        self.state.refresh(tasks);
        let pruned = self.undo.prune();
        if pruned > 0 {
            debug!(pruned, "Expired undo entries dropped");
        }
    }

    /// Fetch the list for the current filter and apply it.
    pub async fn reload(&mut self) -> AppResult<()> {
        let tasks = self.api.list_tasks(&self.filter).await?;
        self.refresh(tasks);
        Ok(())
    }

    /// Re-fetch after a successful write. A failed fetch keeps the local view.
    async fn revalidate(&mut self) {
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Re-fetch after write failed");
        }
    }

    /// Hide the task and dismiss any earlier undo notification for it.
    pub fn begin_delete(&mut self, task_id: &str) -> Result<PendingDelete, BoardError> {
        if is_temporary_id(task_id) {
            return Err(BoardError::Unconfirmed(task_id.to_string()));
        }
        let title = self
            .state
            .find(task_id)
            .map(|t| t.title.clone())
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_string()))?;

        if let Some(previous) = self.undo.remove(&UndoKey::Delete(task_id.to_string())) {
            self.notifier.dismiss(previous.notification);
        }
        self.state.hide(task_id);
        Ok(PendingDelete {
            task_id: task_id.to_string(),
            title,
        })
    }

    /// On success arm a restore; on failure show the task again.
    pub fn finish_delete(
        &mut self,
        pending: PendingDelete,
        result: AppResult<()>,
    ) -> Option<UndoKey> {
        if let Err(e) = result {
            warn!(task_id = %pending.task_id, error = %e, "Delete failed");
            self.state.unhide(&pending.task_id);
            self.notifier.show(NotificationRequest::error(format!(
                "Failed to delete \"{}\"",
                pending.title
            )));
            return None;
        }

        let key = UndoKey::Delete(pending.task_id.clone());
        let notification = self.notifier.show(
            NotificationRequest::success(format!("Deleted \"{}\"", pending.title))
                .with_action(UNDO_LABEL, self.undo.timeout()),
        );
        self.undo.arm(
            key.clone(),
            notification,
            UndoAction::Restore {
                task_id: pending.task_id,
                title: pending.title,
            },
        );
        Some(key)
    }

    pub async fn delete(&mut self, task_id: &str) -> Result<Option<UndoKey>, BoardError> {
        let pending = self.begin_delete(task_id)?;
        let result = self.api.soft_delete_task(&pending.task_id).await;
        let key = self.finish_delete(pending, result);
        if key.is_some() {
            self.revalidate().await;
        }
        Ok(key)
    }

    /// Show a temporary copy of the task at the top of the list.
    pub fn begin_clone(&mut self, task_id: &str) -> Result<PendingClone, BoardError> {
        if is_temporary_id(task_id) {
            return Err(BoardError::Unconfirmed(task_id.to_string()));
        }
        let source = self
            .state
            .find(task_id)
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_string()))?;

        let now = now_ms();
        let temp = Task {
            id: temporary_id(),
            created_at: now,
            updated_at: now,
            ..source.clone()
        };
        let pending = PendingClone {
            source_id: source.id.clone(),
            temp_id: temp.id.clone(),
            title: source.title.clone(),
        };
        self.state.push_clone(temp);
        Ok(pending)
    }

    /// Drop the temporary copy; on success arm a hard delete of the new task.
    pub fn finish_clone(
        &mut self,
        pending: PendingClone,
        result: AppResult<Task>,
    ) -> Option<UndoKey> {
        self.state.remove_clone(&pending.temp_id);

        let cloned = match result {
            Ok(task) => task,
            Err(e) => {
                warn!(task_id = %pending.source_id, error = %e, "Clone failed");
                self.notifier.show(NotificationRequest::error(format!(
                    "Failed to clone \"{}\"",
                    pending.title
                )));
                return None;
            }
        };

        let key = UndoKey::Clone(cloned.id.clone());
        let notification = self.notifier.show(
            NotificationRequest::success(format!("Cloned \"{}\"", pending.title))
                .with_action(UNDO_LABEL, self.undo.timeout()),
        );
        self.undo.arm(
            key.clone(),
            notification,
            UndoAction::HardDelete {
                cloned_id: cloned.id,
                source_id: pending.source_id,
            },
        );
        Some(key)
    }

    pub async fn clone_task(&mut self, task_id: &str) -> Result<Option<UndoKey>, BoardError> {
        let pending = self.begin_clone(task_id)?;
        let result = self.api.clone_task(&pending.source_id).await;
        let key = self.finish_clone(pending, result);
        if key.is_some() {
            self.revalidate().await;
        }
        Ok(key)
    }

    /// Invoke the undo action for `key` if its window is still open.
    ///
    /// A successful restore puts the returned task back into the list before
    /// re-fetching, so it shows up even if the deletion was already confirmed
    /// by an earlier refresh. A failed restore leaves the task hidden until
    /// the next refresh; a failed clone undo leaves the clone in place.
    pub async fn undo(&mut self, key: &UndoKey) -> UndoOutcome {
        let Some(entry) = self.undo.take(key) else {
            return UndoOutcome::Unavailable;
        };
        self.notifier.dismiss(entry.notification);

        match entry.action {
            UndoAction::Restore { task_id, title } => {
                match self.api.restore_task(&task_id).await {
                    Ok(task) => {
                        self.state.unhide(&task_id);
                        if self.filter.matches(&task) {
                            self.state.upsert(task);
                        }
                        self.revalidate().await;
                        UndoOutcome::Reverted
                    }
                    Err(e) => {
                        warn!(task_id = %task_id, error = %e, "Restore failed");
                        self.notifier.show(NotificationRequest::error(format!(
                            "Failed to restore \"{}\"",
                            title
                        )));
                        UndoOutcome::Failed(e)
                    }
                }
            }
            UndoAction::HardDelete { cloned_id, .. } => {
                match self.api.hard_delete_task(&cloned_id).await {
                    Ok(()) => {
                        self.state.remove(&cloned_id);
                        self.revalidate().await;
                        UndoOutcome::Reverted
                    }
                    Err(e) => {
                        warn!(task_id = %cloned_id, error = %e, "Clone undo failed");
                        self.notifier
                            .show(NotificationRequest::error("Failed to undo clone"));
                        UndoOutcome::Failed(e)
                    }
                }
            }
        }
    }

    /// The notification was closed by the user or timed out.
    pub fn notification_dismissed(&mut self, notification: NotificationId) {
        self.undo.forget_notification(notification);
    }
}
