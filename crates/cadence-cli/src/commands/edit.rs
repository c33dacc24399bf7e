use anyhow::{bail, Result};
use cadence_core::models::UpdateTaskData;
use cadence_core::repository::TaskRepository;
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::parser::parse_date;
use crate::util::resolve_task_id;

pub async fn edit_task(repo: &impl TaskRepository, command: EditCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };

    let due_on = if command.due_clear {
        Some(None)
    } else {
        command.due.as_deref().map(parse_date).transpose()?.map(Some)
    };

    let update = UpdateTaskData {
        name: command.name,
        description,
        due_on,
        priority: command.priority,
        recurrence: None,
    };
    if update.name.is_none()
        && update.description.is_none()
        && update.due_on.is_none()
        && update.priority.is_none()
    {
        bail!("Nothing to change. Pass at least one of --name, --description, --due or --priority.");
    }

    let task = repo.update_task(task_id, update).await?;
    println!("{} Updated task: {}", "✓".green().bold(), task.name);
    Ok(())
}
