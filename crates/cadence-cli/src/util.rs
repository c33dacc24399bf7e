use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::models::Task;
use cadence_core::repository::TaskRepository;
use uuid::Uuid;

pub async fn resolve_task_id(repo: &impl TaskRepository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    if let Ok(id) = short_id.parse::<Uuid>() {
        return Ok(id);
    }
    let tasks = repo.find_tasks_by_short_id_prefix(short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.name))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}

/// Resolves a short ID and loads the task it names.
pub async fn resolve_task(repo: &impl TaskRepository, short_id: &str) -> Result<Task> {
    let id = resolve_task_id(repo, short_id).await?;
    repo.find_task_by_id(id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))
}
