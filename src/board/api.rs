//! Client-side view of the task store.

use crate::error::AppResult;
use crate::service::TaskService;
use crate::types::{Session, Task, TaskFilter};
use async_trait::async_trait;

/// Remote operations the board needs.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, filter: &TaskFilter) -> AppResult<Vec<Task>>;
    async fn soft_delete_task(&self, task_id: &str) -> AppResult<()>;
    async fn restore_task(&self, task_id: &str) -> AppResult<Task>;
    async fn hard_delete_task(&self, task_id: &str) -> AppResult<()>;
    async fn clone_task(&self, task_id: &str) -> AppResult<Task>;
}

/// In-process binding of the data access functions to one session.
#[derive(Clone)]
pub struct LocalTaskApi {
    service: TaskService,
    session: Option<Session>,
}

impl LocalTaskApi {
    pub fn new(service: TaskService, session: Option<Session>) -> Self {
        Self { service, session }
    }
}

#[async_trait]
impl TaskApi for LocalTaskApi {
    async fn list_tasks(&self, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        self.service.get_tasks(self.session.as_ref(), filter)
    }

    async fn soft_delete_task(&self, task_id: &str) -> AppResult<()> {
        self.service.soft_delete_task(self.session.as_ref(), task_id)
    }

    async fn restore_task(&self, task_id: &str) -> AppResult<Task> {
        self.service.restore_task(self.session.as_ref(), task_id)
    }

    async fn hard_delete_task(&self, task_id: &str) -> AppResult<()> {
        self.service.hard_delete_task(self.session.as_ref(), task_id)
    }

    async fn clone_task(&self, task_id: &str) -> AppResult<Task> {
        self.service.clone_task(self.session.as_ref(), task_id)
    }
}
