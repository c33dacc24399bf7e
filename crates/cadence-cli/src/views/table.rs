use cadence_core::models::{Task, TaskPriority, TaskStatus};
use cadence_core::recurrence::Occurrence;
use chrono::{Duration, NaiveDate};
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};

/// "today", "in 3 days", "2 weeks ago".
pub fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        _ => HumanTime::from(Duration::days(days)).to_string(),
    }
}

pub fn display_tasks(tasks: &[Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Status", "Due Date", "Recurrence"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(task.short_id()));

        let display_name = if task.is_recurring() {
            format!("↻ {}", task.name)
        } else {
            task.name.clone()
        };
        let mut name_cell = Cell::new(display_name);

        // Style based on status and priority
        match task.status {
            TaskStatus::Completed | TaskStatus::Cancelled => {
                name_cell = name_cell
                    .add_attribute(Attribute::CrossedOut)
                    .fg(Color::DarkGrey);
            }
            TaskStatus::Pending => {
                name_cell = match task.priority {
                    TaskPriority::High => name_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                    TaskPriority::Medium => name_cell.fg(Color::Yellow),
                    TaskPriority::Low => name_cell.fg(Color::Green),
                    TaskPriority::None => name_cell,
                };
            }
        };
        row.add_cell(name_cell);

        let mut status_cell = Cell::new(task.status.to_string());
        status_cell = match task.status {
            TaskStatus::Completed => status_cell.fg(Color::Green),
            TaskStatus::Cancelled => status_cell.fg(Color::DarkGrey),
            TaskStatus::Pending => status_cell,
        };
        row.add_cell(status_cell);

        let due_date_cell = if let Some(due_on) = task.due_on {
            let due_text = format!("{} ({})", due_on, relative_day(due_on, today));
            if task.status == TaskStatus::Pending && due_on < today {
                Cell::new(due_text).fg(Color::Red) // Overdue
            } else if task.status == TaskStatus::Pending && due_on == today {
                Cell::new(due_text).fg(Color::Yellow)
            } else {
                Cell::new(due_text)
            }
        } else {
            Cell::new("None")
        };
        row.add_cell(due_date_cell);

        row.add_cell(Cell::new(
            task.rule()
                .map(|rule| rule.to_string())
                .unwrap_or_else(|| "None".to_string()),
        ));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(occurrences: &[Occurrence], today: NaiveDate) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Due Date", "Weekday", "When", "Scheduled"]);

    for (position, occurrence) in occurrences.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(position + 1));
        row.add_cell(Cell::new(occurrence.due));
        row.add_cell(Cell::new(occurrence.due.format("%a")));
        row.add_cell(Cell::new(relative_day(occurrence.due, today)));
        // Only interesting when the weekend policy moved the date.
        row.add_cell(if occurrence.was_adjusted() {
            Cell::new(format!("moved from {}", occurrence.scheduled)).fg(Color::Yellow)
        } else {
            Cell::new("")
        });
        table.add_row(row);
    }

    println!("{table}");
}
