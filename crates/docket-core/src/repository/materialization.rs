use crate::error::CoreError;
use crate::models::{MaterializationSummary, TaskInstance, TaskTemplate, UpcomingOccurrence};
use crate::repository::{SqliteRepository, TemplateRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
impl super::MaterializationRepository for SqliteRepository {
    async fn materialize_today(&self, owner: Uuid, today: NaiveDate) -> Result<MaterializationSummary, CoreError> {
        // The guard read and the batch insert share one transaction: either
        // every due template gets its instance or none does.
        let mut tx = self.pool().begin().await?;

        let existing: Vec<TaskInstance> = sqlx::query_as(
            "SELECT * FROM task_instances WHERE user_id = $1 AND date = $2"
        )
        .bind(owner)
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let manager = self.materialization_manager();
        if manager.is_day_materialized(&existing) {
            tracing::debug!(%owner, %today, existing = existing.len(), "day already materialized");
            return Ok(MaterializationSummary {
                date: today,
                already_materialized: true,
                ..Default::default()
            });
        }

        let templates: Vec<TaskTemplate> = sqlx::query_as(
            "SELECT * FROM task_templates WHERE user_id = $1 ORDER BY created_at, id"
        )
        .bind(owner)
        .fetch_all(&mut *tx)
        .await?;

        let instances = manager.plan_today(&templates, today);
        for instance in &instances {
            Self::insert_instance_in_transaction(&mut tx, instance).await?;
        }

        tx.commit().await?;

        tracing::info!(
            %owner,
            %today,
            templates = templates.len(),
            created = instances.len(),
            "materialized today's tasks"
        );

        Ok(MaterializationSummary {
            date: today,
            already_materialized: false,
            templates_evaluated: templates.len(),
            instances,
        })
    }

    async fn upcoming(&self, owner: Uuid, today: NaiveDate, days_ahead: u32) -> Result<Vec<UpcomingOccurrence>, CoreError> {
        let templates = self.find_templates_by_owner(owner).await?;
        Ok(self.materialization_manager().forecast(&templates, today, days_ahead))
    }

    fn default_upcoming_days(&self) -> u32 {
        self.materialization_manager().config().upcoming_days
    }
}
