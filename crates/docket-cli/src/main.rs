use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use docket_core::db;
use docket_core::error::CoreError;
use docket_core::recurrence::MaterializationManager;
use docket_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    // Logs go to stderr so tables on stdout stay clean. DOCKET_LOG=debug shows everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DOCKET_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = config::Config::new()?;

    let db_pool = db::establish_connection(&config.database_path).await?;
    let materialization_manager = MaterializationManager::new(config.materialization());
    let repository = SqliteRepository::new(db_pool, materialization_manager);

    // The current date is decided once, here, and passed down explicitly.
    let local_today = Local::now().date_naive();
    let today: NaiveDate = match cli.today.as_deref() {
        Some(date) => parser::parse_date(date, local_today)?,
        None => local_today,
    };

    let command = cli
        .command
        .unwrap_or_else(|| cli::Commands::Dashboard(cli::DashboardCommand::default()));

    if let cli::Commands::Register(command) = command {
        return commands::register::register_user(&repository, command).await;
    }

    let username = cli.user.as_deref().or(config.user.as_deref());
    let user = util::resolve_user(&repository, username).await?;
    tracing::debug!(user = %user.username, %today, "running command");

    match command {
        cli::Commands::Register(_) => Ok(()),
        cli::Commands::Dashboard(command) => {
            commands::dashboard::show_dashboard(&repository, &user, today, command).await
        }
        cli::Commands::Add(command) => commands::add::add_task(&repository, &user, today, command).await,
        cli::Commands::Template(command) => {
            commands::template::template_command(&repository, &user, today, command).await
        }
        cli::Commands::Do(command) => commands::r#do::do_task(&repository, &user, command).await,
        cli::Commands::Describe(command) => {
            commands::describe::describe_task(&repository, &user, command).await
        }
        cli::Commands::Upcoming(command) => {
            commands::upcoming::show_upcoming(&repository, &user, today, command).await
        }
        cli::Commands::History => commands::history::show_history(&repository, &user, today).await,
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::AlreadyExists(s) => {
                eprintln!("{} {} already exists", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(matches) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in matches {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
