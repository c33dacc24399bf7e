use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::recurrence::RecurrenceRule;

pub use sqlx::types::Json;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TaskPriority {
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Date the task is due, after any weekend adjustment.
    pub due_on: Option<NaiveDate>,
    /// Date the recurrence produced for this instance before weekend
    /// adjustment. The next occurrence is computed from here.
    pub anchor_on: Option<NaiveDate>,
    pub completed_on: Option<NaiveDate>,
    /// Stored as the rule's JSON record.
    pub recurrence: Option<Json<RecurrenceRule>>,
    /// Zero-based position of this instance within its recurrence.
    pub occurrence_index: u32,
    /// The completed instance this one was scheduled from.
    pub recurred_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn rule(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref().map(|json| &json.0)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// First seven characters of the ID, as shown in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..7].to_string()
    }
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::None,
            due_on: None,
            anchor_on: None,
            completed_on: None,
            recurrence: None,
            occurrence_index: 0,
            recurred_from: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub name: String,
    pub description: Option<String>,
    pub due_on: Option<NaiveDate>,
    pub priority: Option<TaskPriority>,
    pub recurrence: Option<RecurrenceRule>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub due_on: Option<Option<NaiveDate>>,
    pub priority: Option<TaskPriority>,
    /// Replacing or clearing the rule restarts its occurrence count.
    pub recurrence: Option<Option<RecurrenceRule>>,
}

#[derive(Debug)]
pub enum CompletionResult {
    Single(Task),
    Recurring { completed: Task, next: Task },
    /// The task recurred, but its rule has no further occurrences.
    Finished { completed: Task },
}

impl CompletionResult {
    pub fn completed(&self) -> &Task {
        match self {
            CompletionResult::Single(task) => task,
            CompletionResult::Recurring { completed, .. } => completed,
            CompletionResult::Finished { completed } => completed,
        }
    }
}
