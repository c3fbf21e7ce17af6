use anyhow::Result;
use chrono::NaiveDate;
use docket_core::models::{NewInstanceData, User};
use docket_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::util::resolve_template_id;

pub async fn add_task(repo: &impl Repository, user: &User, today: NaiveDate, command: AddCommand) -> Result<()> {
    let template_id = match command.template.as_deref() {
        Some(short_id) => Some(resolve_template_id(repo, user.id, short_id).await?),
        None => None,
    };

    let new_task = NewInstanceData {
        name: command.name.unwrap_or_default(),
        description: command.description,
        date: today,
        template_id,
    };

    let task = repo.add_instance(user.id, new_task).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Added task: {}",
        "✓".style(success_style),
        task.name.bright_white().bold()
    );
    println!(
        "  {} Task ID: {}",
        "→".blue(),
        task.id.to_string().yellow()
    );
    Ok(())
}
