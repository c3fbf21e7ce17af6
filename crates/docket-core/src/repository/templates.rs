use crate::error::CoreError;
use crate::models::{NewTemplateData, TaskTemplate};
use crate::repository::{filter_by_short_id, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::TemplateRepository for SqliteRepository {
    async fn add_template(&self, owner: Uuid, data: NewTemplateData) -> Result<TaskTemplate, CoreError> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Template name cannot be empty".to_string()));
        }
        data.rule.validate()?;

        let columns = data.rule.to_columns();
        let template = TaskTemplate {
            id: Uuid::now_v7(),
            user_id: owner,
            name: name.to_string(),
            description: data.description,
            frequency: columns.frequency,
            weekdays: columns.weekdays,
            day_of_month: columns.day_of_month,
            specific_date: columns.specific_date,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO task_templates (id, user_id, name, description, frequency, weekdays, day_of_month, specific_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#
        )
        .bind(template.id)
        .bind(template.user_id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.frequency)
        .bind(&template.weekdays)
        .bind(template.day_of_month)
        .bind(template.specific_date)
        .bind(template.created_at)
        .execute(self.pool())
        .await?;

        tracing::info!(
            template_id = %template.id,
            frequency = %template.frequency,
            "created template"
        );
        Ok(template)
    }

    async fn find_template_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskTemplate>, CoreError> {
        let template = sqlx::query_as("SELECT * FROM task_templates WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool())
            .await?;
        Ok(template)
    }

    async fn find_templates_by_owner(&self, owner: Uuid) -> Result<Vec<TaskTemplate>, CoreError> {
        let templates = sqlx::query_as(
            "SELECT * FROM task_templates WHERE user_id = $1 ORDER BY created_at, id"
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(templates)
    }

    async fn find_templates_by_short_id_prefix(&self, owner: Uuid, short_id: &str) -> Result<Vec<TaskTemplate>, CoreError> {
        let templates = self.find_templates_by_owner(owner).await?;
        Ok(filter_by_short_id(templates, short_id, |t| t.id))
    }
}
