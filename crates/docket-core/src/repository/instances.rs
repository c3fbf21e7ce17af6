use crate::error::CoreError;
use crate::models::{NewInstanceData, TaskInstance};
use crate::repository::{filter_by_short_id, SqliteRepository, TemplateRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::InstanceRepository for SqliteRepository {
    async fn add_instance(&self, owner: Uuid, data: NewInstanceData) -> Result<TaskInstance, CoreError> {
        let (mut name, mut description) = (data.name.trim().to_string(), data.description);

        // A task added from a template takes the template's name and
        // description unless the caller supplied its own.
        if let Some(template_id) = data.template_id {
            let template = self
                .find_template_by_id(owner, template_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Template with id {} not found", template_id)))?;
            if name.is_empty() {
                name = template.name;
            }
            if description.is_none() {
                description = template.description;
            }
        }

        if name.is_empty() {
            return Err(CoreError::InvalidInput("Task name cannot be empty".to_string()));
        }

        let instance = TaskInstance {
            id: Uuid::now_v7(),
            user_id: owner,
            template_id: data.template_id,
            name,
            description,
            done: false,
            completed_at: None,
            date: data.date,
            created_at: Utc::now(),
        };

        let mut tx = self.pool().begin().await?;
        Self::insert_instance_in_transaction(&mut tx, &instance).await?;
        tx.commit().await?;

        tracing::debug!(instance_id = %instance.id, date = %instance.date, "added task");
        Ok(instance)
    }

    async fn find_instance_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskInstance>, CoreError> {
        let instance = sqlx::query_as("SELECT * FROM task_instances WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool())
            .await?;
        Ok(instance)
    }

    async fn find_instances_by_owner(&self, owner: Uuid) -> Result<Vec<TaskInstance>, CoreError> {
        let instances = sqlx::query_as(
            "SELECT * FROM task_instances WHERE user_id = $1 ORDER BY date DESC, created_at, id"
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(instances)
    }

    async fn find_instances_by_owner_and_date(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<TaskInstance>, CoreError> {
        let instances = sqlx::query_as(
            "SELECT * FROM task_instances WHERE user_id = $1 AND date = $2 ORDER BY created_at, id"
        )
        .bind(owner)
        .bind(date)
        .fetch_all(self.pool())
        .await?;
        Ok(instances)
    }

    async fn find_instances_by_short_id_prefix(&self, owner: Uuid, short_id: &str) -> Result<Vec<TaskInstance>, CoreError> {
        let instances = self.find_instances_by_owner(owner).await?;
        Ok(filter_by_short_id(instances, short_id, |i| i.id))
    }

    async fn complete_instance(&self, owner: Uuid, id: Uuid, now: DateTime<Utc>) -> Result<TaskInstance, CoreError> {
        // completed_at is only ever set once.
        let result = sqlx::query(
            r#"UPDATE task_instances
            SET done = TRUE, completed_at = COALESCE(completed_at, $1)
            WHERE id = $2 AND user_id = $3"#
        )
        .bind(now)
        .bind(id)
        .bind(owner)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Task with id {} not found", id)));
        }

        self.find_instance_by_id(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", id)))
    }

    async fn update_instance_description(&self, owner: Uuid, id: Uuid, description: Option<String>) -> Result<TaskInstance, CoreError> {
        let result = sqlx::query("UPDATE task_instances SET description = $1 WHERE id = $2 AND user_id = $3")
            .bind(&description)
            .bind(id)
            .bind(owner)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Task with id {} not found", id)));
        }

        self.find_instance_by_id(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", id)))
    }
}

impl SqliteRepository {
    /// Inserts one instance as part of a larger transaction
    pub(crate) async fn insert_instance_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        instance: &TaskInstance,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO task_instances (id, user_id, template_id, name, description, done, completed_at, date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#
        )
        .bind(instance.id)
        .bind(instance.user_id)
        .bind(instance.template_id)
        .bind(&instance.name)
        .bind(&instance.description)
        .bind(instance.done)
        .bind(instance.completed_at)
        .bind(instance.date)
        .bind(instance.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
