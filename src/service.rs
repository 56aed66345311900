//! Data access functions.
//!
//! Each operation checks for a session first, then validates input, then
//! talks to the store, and finally signals revalidation for mutations.

use crate::auth::require_session;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::revalidate::{MutationKind, RevalidationBus};
use crate::types::{
    CreateLabelInput, CreateTaskInput, Label, LabelWithCount, Session, Task, TaskFilter,
    UpdateTaskInput,
};
use crate::validation;
use std::sync::Arc;
use tracing::info;

/// User-scoped task and label operations.
#[derive(Clone)]
pub struct TaskService {
    db: Arc<Database>,
    bus: Arc<RevalidationBus>,
}

impl TaskService {
    pub fn new(db: Arc<Database>, bus: Arc<RevalidationBus>) -> Self {
        Self { db, bus }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn revalidation(&self) -> &Arc<RevalidationBus> {
        &self.bus
    }

    pub fn create_task(
        &self,
        session: Option<&Session>,
        input: &CreateTaskInput,
    ) -> AppResult<Task> {
        let session = require_session(session)?;
        let input = validation::create_task(input)?;
        let task = self.db.create_task(session.user_id(), &input)?;
        info!(task_id = %task.id, user_id = %session.user_id(), "Task created");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(task)
    }

    /// Live tasks matching `filter`, most recently updated first.
    pub fn get_tasks(&self, session: Option<&Session>, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        let session = require_session(session)?;
        Ok(self.db.list_tasks(session.user_id(), filter)?)
    }

    pub fn get_task(&self, session: Option<&Session>, task_id: &str) -> AppResult<Task> {
        let session = require_session(session)?;
        self.db
            .get_task(session.user_id(), task_id)?
            .ok_or_else(|| AppError::task_not_found(task_id))
    }

    /// Partial update; `label_ids` replaces the association set when present.
    pub fn update_task(
        &self,
        session: Option<&Session>,
        task_id: &str,
        input: &UpdateTaskInput,
    ) -> AppResult<Task> {
        let session = require_session(session)?;
        let input = validation::update_task(input)?;
        if input.is_empty() {
            return self.get_task(Some(session), task_id);
        }
        let task = self
            .db
            .update_task(session.user_id(), task_id, &input)?
            .ok_or_else(|| AppError::task_not_found(task_id))?;
        info!(task_id = %task.id, "Task updated");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(task)
    }

    pub fn soft_delete_task(&self, session: Option<&Session>, task_id: &str) -> AppResult<()> {
        let session = require_session(session)?;
        if !self.db.soft_delete_task(session.user_id(), task_id)? {
            return Err(AppError::task_not_found(task_id));
        }
        info!(task_id = %task_id, "Task soft-deleted");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(())
    }

    pub fn restore_task(&self, session: Option<&Session>, task_id: &str) -> AppResult<Task> {
        let session = require_session(session)?;
        let task = self
            .db
            .restore_task(session.user_id(), task_id)?
            .ok_or_else(|| AppError::task_not_found(task_id))?;
        info!(task_id = %task_id, "Task restored");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(task)
    }

    pub fn hard_delete_task(&self, session: Option<&Session>, task_id: &str) -> AppResult<()> {
        let session = require_session(session)?;
        if !self.db.hard_delete_task(session.user_id(), task_id)? {
            return Err(AppError::task_not_found(task_id));
        }
        info!(task_id = %task_id, "Task permanently deleted");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(())
    }

    pub fn clone_task(&self, session: Option<&Session>, task_id: &str) -> AppResult<Task> {
        let session = require_session(session)?;
        let task = self
            .db
            .clone_task(session.user_id(), task_id)?
            .ok_or_else(|| AppError::task_not_found(task_id))?;
        info!(source_id = %task_id, task_id = %task.id, "Task cloned");
        self.bus.notify(&[MutationKind::TaskChanged]);
        Ok(task)
    }

    pub fn get_labels(&self, session: Option<&Session>) -> AppResult<Vec<LabelWithCount>> {
        require_session(session)?;
        Ok(self.db.list_labels()?)
    }

    pub fn create_label(
        &self,
        session: Option<&Session>,
        input: &CreateLabelInput,
    ) -> AppResult<Label> {
        require_session(session)?;
        let input = validation::create_label(input)?;
        let color = input
            .color
            .as_deref()
            .unwrap_or(validation::DEFAULT_LABEL_COLOR);
        let label = self.db.create_label(&input.name, color)?;
        info!(label_id = %label.id, name = %label.name, "Label created");
        self.bus.notify(&[MutationKind::LabelChanged]);
        Ok(label)
    }
}
