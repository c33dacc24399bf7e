use anyhow::Result;
use cadence_core::models::TaskStatus;
use cadence_core::repository::{TaskFilter, TaskRepository};
use chrono::Local;

use crate::cli::ListCommand;
use crate::views::table::display_tasks;

pub async fn list_tasks(repo: &impl TaskRepository, command: ListCommand) -> Result<()> {
    let status = if command.all {
        None
    } else {
        Some(command.status.unwrap_or(TaskStatus::Pending))
    };
    let filter = TaskFilter {
        status,
        recurring_only: command.recurring,
    };

    let tasks = repo.find_tasks(filter).await?;
    display_tasks(&tasks, Local::now().date_naive());

    Ok(())
}
