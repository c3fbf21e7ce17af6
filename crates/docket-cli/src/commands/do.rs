use anyhow::Result;
use chrono::Utc;
use docket_core::models::User;
use docket_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::DoCommand;
use crate::util::resolve_instance_id;

pub async fn do_task(repo: &impl Repository, user: &User, command: DoCommand) -> Result<()> {
    let task_id = resolve_instance_id(repo, user.id, &command.id).await?;
    let task = repo.complete_instance(user.id, task_id, Utc::now()).await?;

    println!("{} Completed task: '{}'", "✓".green().bold(), task.name);
    Ok(())
}
