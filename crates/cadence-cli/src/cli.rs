use cadence_core::models::{TaskPriority, TaskStatus};
use cadence_core::recurrence::WeekendPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// A terminal task manager with calendar-aware recurring tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Mark a task as completed, scheduling the next one if it recurs
    Do(DoCommand),
    /// Cancel a task
    Cancel(CancelCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Manage a task's recurrence
    Recur(RecurCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The name of the task
    pub name: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// The due date of the task (e.g., '2025-08-20', 'next friday')
    #[clap(long)]
    pub due: Option<String>,
    /// The priority of the task (none, low, medium, high)
    #[clap(short, long)]
    pub priority: Option<TaskPriority>,

    #[command(flatten)]
    pub rule: RuleArgs,
}

/// Flags describing a recurrence rule. Everything but `--every` is optional.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Repeat every day, week, month or year
    #[arg(long, value_enum)]
    pub every: Option<EveryUnit>,
    /// Number of units between occurrences
    #[arg(long, requires = "every")]
    pub interval: Option<u32>,
    /// Weekdays for weekly rules (e.g., 'mon,wed,fri')
    #[arg(long, requires = "every", conflicts_with_all = ["day", "week"])]
    pub on: Option<String>,
    /// Day of month (1-31) for monthly and yearly rules
    #[arg(long, requires = "every", conflicts_with = "week")]
    pub day: Option<u8>,
    /// Week of month (1-5 or 'last'), together with --weekday
    #[arg(long, requires_all = ["every", "weekday"])]
    pub week: Option<String>,
    /// Weekday for --week (e.g., 'fri')
    #[arg(long, requires = "week")]
    pub weekday: Option<String>,
    /// Month for yearly rules (name or 1-12), together with --day
    #[arg(long, requires_all = ["every", "day"])]
    pub month: Option<String>,
    /// Earliest date an occurrence may fall on
    #[arg(long, requires = "every")]
    pub start: Option<String>,
    /// Stop before this date
    #[arg(long, requires = "every", conflicts_with = "count")]
    pub until: Option<String>,
    /// Stop after this many occurrences
    #[arg(long, requires = "every")]
    pub count: Option<u32>,
    /// Weekend handling (no-change, nearest-weekday, previous-weekday, next-weekday)
    #[arg(long, requires = "every")]
    pub on_weekend: Option<WeekendPolicy>,
    /// Count the next occurrence from the completion date
    #[arg(long, requires = "every")]
    pub from_completion: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EveryUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    #[arg(long)]
    pub priority: Option<TaskPriority>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
    /// Completion date, if not today
    #[clap(long)]
    pub on: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CancelCommand {
    /// The ID of the task to cancel
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only show tasks with this status (pending, completed, cancelled)
    #[clap(long, conflicts_with = "all")]
    pub status: Option<TaskStatus>,
    /// Show tasks of every status
    #[clap(short, long)]
    pub all: bool,
    /// Only show recurring tasks
    #[clap(short, long)]
    pub recurring: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurCommand {
    #[command(subcommand)]
    pub command: RecurSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurSubcommand {
    /// Set or replace a task's recurrence rule
    Set(RecurSetCommand),
    /// Turn a recurring task into a one-off
    Clear(RecurIdCommand),
    /// Describe a task's recurrence rule
    Show(RecurIdCommand),
    /// List the upcoming occurrences of a task
    Preview(RecurPreviewCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct RecurSetCommand {
    /// The ID of the task
    pub id: String,
    #[command(flatten)]
    pub rule: RuleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurIdCommand {
    /// The ID of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurPreviewCommand {
    /// The ID of the task
    pub id: String,
    /// Number of occurrences to show
    #[clap(long, short)]
    pub count: Option<usize>,
}
