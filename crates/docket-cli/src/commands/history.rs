use anyhow::Result;
use chrono::NaiveDate;
use docket_core::models::{group_by_date, User};
use docket_core::repository::Repository;

use crate::views::table::display_history;

pub async fn show_history(repo: &impl Repository, user: &User, today: NaiveDate) -> Result<()> {
    let history = group_by_date(repo.find_instances_by_owner(user.id).await?);
    display_history(&history, today);
    Ok(())
}
