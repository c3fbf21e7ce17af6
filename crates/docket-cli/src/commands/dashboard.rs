use anyhow::Result;
use chrono::NaiveDate;
use docket_core::models::User;
use docket_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::DashboardCommand;
use crate::views::table::{display_history, display_tasks, display_upcoming};

pub async fn show_dashboard(
    repo: &impl Repository,
    user: &User,
    today: NaiveDate,
    command: DashboardCommand,
) -> Result<()> {
    let days = command.days.unwrap_or_else(|| repo.default_upcoming_days());
    let dashboard = repo.load_dashboard(user.id, today, days).await?;

    if dashboard.summary.instances_created() > 0 {
        println!(
            "{} Created {} task(s) for {}",
            "↻".blue(),
            dashboard.summary.instances_created(),
            today
        );
    }

    println!("{}", format!("Today, {}", today).bold());
    display_tasks(&dashboard.today_tasks);

    println!();
    println!("{}", format!("Upcoming (next {} days)", days).bold());
    display_upcoming(&dashboard.upcoming, today);

    // Earlier days only; today is already shown above.
    let earlier: Vec<_> = dashboard
        .history
        .into_iter()
        .filter(|group| group.date != today)
        .collect();
    if !earlier.is_empty() {
        println!();
        println!("{}", "History".bold());
        display_history(&earlier, today);
    }

    Ok(())
}
