use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{CompletionResult, NewTaskData, Task, TaskStatus, UpdateTaskData};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

pub mod tasks;

/// Which tasks a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// `None` lists every status.
    pub status: Option<TaskStatus>,
    /// Only tasks that carry a recurrence rule.
    pub recurring_only: bool,
}

impl TaskFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(TaskStatus::Pending),
            recurring_only: false,
        }
    }
}

/// Task storage, and the collaborator that turns a completed recurring task
/// into its next instance.
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
    async fn cancel_task(&self, id: Uuid) -> Result<Task, CoreError>;
    /// Marks the task completed on `completed_on` and, for recurring tasks,
    /// schedules the next instance.
    async fn complete_task(&self, id: Uuid, completed_on: NaiveDate) -> Result<CompletionResult, CoreError>;
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}
