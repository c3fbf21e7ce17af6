use anyhow::Result;
use docket_core::models::User;
use docket_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::DescribeCommand;
use crate::util::resolve_instance_id;

pub async fn describe_task(repo: &impl Repository, user: &User, command: DescribeCommand) -> Result<()> {
    let task_id = resolve_instance_id(repo, user.id, &command.id).await?;
    let description = if command.clear { None } else { command.description };

    let task = repo
        .update_instance_description(user.id, task_id, description)
        .await?;

    match task.description {
        Some(description) => println!(
            "{} Updated description of '{}': {}",
            "✓".green().bold(),
            task.name,
            description
        ),
        None => println!("{} Cleared description of '{}'", "✓".green().bold(), task.name),
    }
    Ok(())
}
