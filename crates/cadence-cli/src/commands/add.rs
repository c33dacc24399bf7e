use anyhow::Result;
use cadence_core::models::NewTaskData;
use cadence_core::repository::TaskRepository;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::{parse_date, rule_from_args};

pub async fn add_task(repo: &impl TaskRepository, command: AddCommand, config: &Config) -> Result<()> {
    let due_on = command.due.as_deref().map(parse_date).transpose()?;
    let recurrence = rule_from_args(&command.rule, config.default_on_weekend)?;

    let new_task_data = NewTaskData {
        name: command.name,
        description: command.description,
        due_on,
        priority: command.priority,
        recurrence,
    };
    let added_task = repo.add_task(new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    let kind = if added_task.is_recurring() { "recurring task" } else { "task" };
    println!(
        "{} Created {}: {}",
        "✓".style(success_style),
        kind,
        added_task.name.bright_white().bold()
    );
    println!(
        "  {} Task ID: {}",
        "→".style(info_style),
        added_task.short_id().yellow()
    );
    if let Some(due_on) = added_task.due_on {
        println!("  {} Due: {}", "→".style(info_style), due_on.to_string().cyan());
    }
    if let Some(rule) = added_task.rule() {
        println!("  {} Repeats {}", "→".style(info_style), rule);
        if added_task.due_on.is_none() {
            println!(
                "  {} No due date; the first repeat is counted from completion",
                "→".style(info_style)
            );
        }
    }

    Ok(())
}
