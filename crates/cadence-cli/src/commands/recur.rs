use anyhow::{bail, Result};
use cadence_core::models::{Task, UpdateTaskData};
use cadence_core::recurrence::{is_default_rule, Occurrences, Preset, RecurrenceRule, RuleRecord};
use cadence_core::repository::TaskRepository;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;

use crate::cli::{RecurCommand, RecurIdCommand, RecurPreviewCommand, RecurSetCommand, RecurSubcommand};
use crate::config::Config;
use crate::parser::rule_from_args;
use crate::util::{resolve_task, resolve_task_id};
use crate::views::table::display_occurrences;

pub async fn recur_command(repo: &impl TaskRepository, command: RecurCommand, config: &Config) -> Result<()> {
    match command.command {
        RecurSubcommand::Set(command) => set_rule(repo, command, config).await,
        RecurSubcommand::Clear(command) => clear_rule(repo, command).await,
        RecurSubcommand::Show(command) => show_rule(repo, command).await,
        RecurSubcommand::Preview(command) => preview(repo, command, config).await,
    }
}

async fn set_rule(repo: &impl TaskRepository, command: RecurSetCommand, config: &Config) -> Result<()> {
    let Some(rule) = rule_from_args(&command.rule, config.default_on_weekend)? else {
        bail!("--every is required to set a recurrence");
    };
    let task_id = resolve_task_id(repo, &command.id).await?;

    let task = repo
        .update_task(
            task_id,
            UpdateTaskData {
                recurrence: Some(Some(rule)),
                ..Default::default()
            },
        )
        .await?;

    if let Some(rule) = task.rule() {
        println!("{} '{}' now repeats {}", "✓".green().bold(), task.name, rule);
    }
    Ok(())
}

async fn clear_rule(repo: &impl TaskRepository, command: RecurIdCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .update_task(
            task_id,
            UpdateTaskData {
                recurrence: Some(None),
                ..Default::default()
            },
        )
        .await?;
    println!("{} '{}' no longer repeats", "✓".green().bold(), task.name);
    Ok(())
}

fn recurring_rule(task: &Task) -> Result<&RecurrenceRule> {
    match task.rule() {
        Some(rule) => Ok(rule),
        None => bail!("Task '{}' does not recur", task.name),
    }
}

fn preset_label(rule: &RecurrenceRule) -> &'static str {
    match Preset::classify(Some(rule)) {
        Some(Preset::Daily) => "daily",
        Some(Preset::Weekly) => "weekly",
        Some(Preset::Monthly) => "monthly",
        Some(Preset::Yearly) => "yearly",
        Some(Preset::None) | None => "custom",
    }
}

async fn show_rule(repo: &impl TaskRepository, command: RecurIdCommand) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;
    let rule = recurring_rule(&task)?;

    println!("{}", task.name.bright_white().bold());
    println!("  Repeats:     {}", rule);
    println!("  Kind:        {}", preset_label(rule));
    println!("  Weekends:    {}", serde_plain::to_string(&rule.on_weekend())?);
    println!("  Counted from {}", if rule.base_on_completion() { "completion" } else { "schedule" });
    let position = task.occurrence_index + 1;
    match rule.max_count() {
        Some(max) => println!("  Occurrence:  {} of {}", position, max),
        None => println!("  Occurrence:  {}", position),
    }
    println!(
        "  Simple:      {}",
        if is_default_rule(Some(rule)) { "yes" } else { "no" }
    );

    println!("{}", "  Stored as:".bright_black());
    let record = serde_json::to_string_pretty(&RuleRecord::from(rule.clone()))?;
    for line in record.lines() {
        println!("    {}", line.bright_black());
    }
    Ok(())
}

/// The date the next occurrence is counted from, assuming the task is
/// completed on `today`.
fn preview_basis(task: &Task, rule: &RecurrenceRule, today: NaiveDate) -> NaiveDate {
    if rule.base_on_completion() {
        today
    } else {
        task.anchor_on.or(task.due_on).unwrap_or(today)
    }
}

async fn preview(repo: &impl TaskRepository, command: RecurPreviewCommand, config: &Config) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;
    let rule = recurring_rule(&task)?;
    let today = Local::now().date_naive();
    let count = command.count.unwrap_or(config.preview_count);

    let basis = preview_basis(&task, rule, today);
    let produced = task.occurrence_index.saturating_add(1);
    let upcoming: Vec<_> = Occurrences::new(rule, basis, produced).take(count).collect();

    println!("{} repeats {}", task.name.bright_white().bold(), rule);
    if let Some(due_on) = task.due_on {
        println!("Current occurrence due {}", due_on.to_string().cyan());
    }
    if rule.base_on_completion() {
        println!("{}", "Dates assume the task is completed today.".bright_black());
    }
    display_occurrences(&upcoming, today);
    Ok(())
}
