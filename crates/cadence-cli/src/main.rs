use cadence_core::db;
use cadence_core::error::CoreError;
use cadence_core::repository::SqliteRepository;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CADENCE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    tracing::debug!(database = %config.database_path.display(), "loaded configuration");

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool);

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, command, &config).await,
        cli::Commands::List(command) => commands::list::list_tasks(&repository, command).await,
        cli::Commands::Delete(command) => commands::delete::delete_task(&repository, command).await,
        cli::Commands::Do(command) => commands::r#do::do_task(&repository, command).await,
        cli::Commands::Cancel(command) => commands::cancel::cancel_task(&repository, command).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&repository, command).await,
        cli::Commands::Recur(command) => {
            commands::recur::recur_command(&repository, command, &config).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} Task not found: {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in tasks {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidRule(rule_error) => {
                eprintln!("{} Invalid recurrence: {}", "Error:".style(error_style), rule_error);
            }
            CoreError::AlreadyClosed(name, status) => {
                eprintln!(
                    "{} Task '{}' is already {}",
                    "Error:".style(error_style),
                    name.yellow(),
                    status
                );
            }
            CoreError::Database(source) => {
                tracing::error!(error = ?source, "database operation failed");
                eprintln!("{} {}: {}", "Error:".style(error_style), core_error, source);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
