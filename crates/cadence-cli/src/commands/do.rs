use anyhow::Result;
use cadence_core::models::CompletionResult;
use cadence_core::repository::TaskRepository;
use chrono::Local;
use owo_colors::OwoColorize;

use crate::cli::DoCommand;
use crate::parser::parse_date;
use crate::util::resolve_task_id;

pub async fn do_task(repo: &impl TaskRepository, command: DoCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let completed_on = match command.on.as_deref() {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };

    match repo.complete_task(task_id, completed_on).await? {
        CompletionResult::Single(task) => {
            println!("Completed task: '{}'", task.name);
        }
        CompletionResult::Recurring { completed, next } => {
            println!("Completed task: '{}'", completed.name);
            match (next.due_on, next.anchor_on) {
                (Some(due), Some(anchor)) if due != anchor => println!(
                    "Next occurrence {} is due {} (moved from {})",
                    next.short_id().yellow(),
                    due.to_string().cyan(),
                    anchor
                ),
                (Some(due), _) => println!(
                    "Next occurrence {} is due {}",
                    next.short_id().yellow(),
                    due.to_string().cyan()
                ),
                (None, _) => println!("Next occurrence {} created", next.short_id().yellow()),
            }
        }
        CompletionResult::Finished { completed } => {
            println!("Completed task: '{}'", completed.name);
            println!("{}", "This was the last occurrence.".bright_black());
        }
    }

    Ok(())
}
