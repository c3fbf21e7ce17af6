use crate::error::CoreError;
use crate::models::{group_by_date, Dashboard};
use crate::repository::{InstanceRepository, MaterializationRepository, SqliteRepository, TemplateRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
impl super::DashboardRepository for SqliteRepository {
    async fn load_dashboard(&self, owner: Uuid, today: NaiveDate, days_ahead: u32) -> Result<Dashboard, CoreError> {
        // Today's tasks must exist before they are read.
        let summary = self.materialize_today(owner, today).await?;

        let today_tasks = self.find_instances_by_owner_and_date(owner, today).await?;
        let history = group_by_date(self.find_instances_by_owner(owner).await?);
        let templates = self.find_templates_by_owner(owner).await?;
        let upcoming = self
            .materialization_manager()
            .forecast(&templates, today, days_ahead);

        Ok(Dashboard {
            today,
            summary,
            today_tasks,
            history,
            templates,
            upcoming,
        })
    }
}
