use anyhow::Result;
use cadence_core::repository::TaskRepository;
use dialoguer::Confirm;

use crate::cli::DeleteCommand;
use crate::util::resolve_task;

pub async fn delete_task(repo: &impl TaskRepository, command: DeleteCommand) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete task '{}'?", task.name))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(task.id).await?;
    println!("Task deleted successfully.");
    Ok(())
}
