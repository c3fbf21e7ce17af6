use anyhow::Result;
use chrono::NaiveDate;
use docket_core::models::User;
use docket_core::repository::Repository;

use crate::cli::UpcomingCommand;
use crate::views::table::display_upcoming;

pub async fn show_upcoming(
    repo: &impl Repository,
    user: &User,
    today: NaiveDate,
    command: UpcomingCommand,
) -> Result<()> {
    let days = command.days.unwrap_or_else(|| repo.default_upcoming_days());
    let upcoming = repo.upcoming(user.id, today, days).await?;
    display_upcoming(&upcoming, today);
    Ok(())
}
