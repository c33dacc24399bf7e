use crate::error::CoreError;
use crate::models::{CompletionResult, NewTaskData, Task, TaskPriority, TaskStatus, UpdateTaskData};
use crate::recurrence::{compute_next_occurrence, RecurrenceRule};
use crate::repository::{SqliteRepository, TaskFilter};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracing::info;
use uuid::Uuid;

/// Column values for a freshly inserted task.
struct TaskInsert<'a> {
    name: &'a str,
    description: Option<&'a str>,
    priority: TaskPriority,
    due_on: Option<NaiveDate>,
    anchor_on: Option<NaiveDate>,
    recurrence: Option<&'a RecurrenceRule>,
    occurrence_index: u32,
    recurred_from: Option<Uuid>,
}

impl SqliteRepository {
    async fn insert_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        row: TaskInsert<'_>,
    ) -> Result<Task, CoreError> {
        let now = Utc::now();
        let task = sqlx::query_as(
            r#"INSERT INTO tasks (
                id, name, description, status, priority, due_on, anchor_on,
                recurrence, occurrence_index, recurred_from, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(row.name)
        .bind(row.description)
        .bind(TaskStatus::Pending)
        .bind(row.priority)
        .bind(row.due_on)
        .bind(row.anchor_on)
        .bind(row.recurrence.map(Json))
        .bind(row.occurrence_index)
        .bind(row.recurred_from)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(task)
    }
}

fn validate_name(name: &str) -> Result<&str, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("Task name cannot be empty.".to_string()));
    }
    Ok(name)
}

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let name = validate_name(&data.name)?;
        let mut tx = self.pool().begin().await?;

        let task = Self::insert_in_transaction(
            &mut tx,
            TaskInsert {
                name,
                description: data.description.as_deref(),
                priority: data.priority.unwrap_or(TaskPriority::None),
                due_on: data.due_on,
                anchor_on: data.due_on,
                recurrence: data.recurrence.as_ref(),
                occurrence_index: 0,
                recurred_from: None,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        // IDs are stored as 16-byte blobs; match against their hex form.
        if let Some(c) = short_id.chars().find(|c| *c != '-' && !c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidInput(format!(
                "'{}' is not a valid task ID: unexpected character '{}'",
                short_id, c
            )));
        }
        let mut pattern: String = short_id
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        pattern.push('%');

        let tasks: Vec<Task> = sqlx::query_as("SELECT * FROM tasks WHERE hex(id) LIKE $1")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn find_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM tasks WHERE 1 = 1");

        if let Some(status) = filter.status {
            query_builder.push(" AND status = ").push_bind(status);
        }
        if filter.recurring_only {
            query_builder.push(" AND recurrence IS NOT NULL");
        }
        query_builder.push(" ORDER BY due_on IS NULL, due_on, created_at");

        let tasks = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut task = self
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if let Some(name) = data.name {
            task.name = validate_name(&name)?.to_string();
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(due_on) = data.due_on {
            // A manually moved due date becomes the new basis.
            task.due_on = due_on;
            task.anchor_on = due_on;
        }
        if let Some(recurrence) = data.recurrence {
            task.recurrence = recurrence.map(Json);
            task.occurrence_index = 0;
        }

        let updated = sqlx::query_as(
            r#"UPDATE tasks
            SET name = $1, description = $2, priority = $3, due_on = $4, anchor_on = $5,
                recurrence = $6, occurrence_index = $7, updated_at = $8
            WHERE id = $9
            RETURNING *"#,
        )
        .bind(task.name)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.due_on)
        .bind(task.anchor_on)
        .bind(task.recurrence)
        .bind(task.occurrence_index)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(self.pool())
        .await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn cancel_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let task = self
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if task.status != TaskStatus::Pending {
            return Err(CoreError::AlreadyClosed(task.name, task.status.to_string()));
        }

        let cancelled = sqlx::query_as(
            "UPDATE tasks SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(TaskStatus::Cancelled)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(self.pool())
        .await?;
        Ok(cancelled)
    }

    async fn complete_task(&self, id: Uuid, completed_on: NaiveDate) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if task.status != TaskStatus::Pending {
            return Err(CoreError::AlreadyClosed(task.name, task.status.to_string()));
        }

        // Mark the current task as completed
        let completed: Task = sqlx::query_as(
            r#"UPDATE tasks
            SET status = $1, completed_on = $2, updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(TaskStatus::Completed)
        .bind(completed_on)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let Some(rule) = completed.rule().cloned() else {
            tx.commit().await?;
            return Ok(CompletionResult::Single(completed));
        };

        let basis = if rule.base_on_completion() {
            completed_on
        } else {
            completed
                .anchor_on
                .or(completed.due_on)
                .unwrap_or(completed_on)
        };
        // This instance and everything before it have been produced already.
        let produced = completed.occurrence_index.saturating_add(1);

        let Some(occurrence) = compute_next_occurrence(&rule, basis, produced) else {
            tx.commit().await?;
            info!(task = %completed.id, %basis, produced, "recurrence finished");
            return Ok(CompletionResult::Finished { completed });
        };

        let next = Self::insert_in_transaction(
            &mut tx,
            TaskInsert {
                name: &completed.name,
                description: completed.description.as_deref(),
                priority: completed.priority,
                due_on: Some(occurrence.due),
                anchor_on: Some(occurrence.scheduled),
                recurrence: Some(&rule),
                occurrence_index: produced,
                recurred_from: Some(completed.id),
            },
        )
        .await?;

        tx.commit().await?;
        info!(
            task = %completed.id,
            next = %next.id,
            due = %occurrence.due,
            scheduled = %occurrence.scheduled,
            "scheduled next occurrence"
        );
        Ok(CompletionResult::Recurring { completed, next })
    }
}
