use anyhow::Result;
use docket_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::RegisterCommand;

pub async fn register_user(repo: &impl Repository, command: RegisterCommand) -> Result<()> {
    let user = repo.add_user(&command.username).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Registered user: {}",
        "✓".style(success_style),
        user.username.bright_white().bold()
    );
    println!(
        "  {} Use it with `docket --user {}` or set `user = \"{}\"` in docket.toml",
        "→".blue(),
        user.username,
        user.username
    );
    Ok(())
}
