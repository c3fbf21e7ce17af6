use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Dashboard, MaterializationSummary, NewInstanceData, NewTemplateData, TaskInstance,
    TaskTemplate, UpcomingOccurrence, User,
};
use crate::recurrence::MaterializationManager;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub mod users;
pub mod templates;
pub mod instances;
pub mod materialization;
pub mod dashboard;

// Every operation below that takes an `owner` only ever sees that user's rows.

/// Domain-specific trait for user operations
#[async_trait]
pub trait UserRepository {
    async fn add_user(&self, username: &str) -> Result<User, CoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError>;
    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>, CoreError>;
    async fn find_users(&self) -> Result<Vec<User>, CoreError>;
}

/// Domain-specific trait for template operations
#[async_trait]
pub trait TemplateRepository {
    async fn add_template(&self, owner: Uuid, data: NewTemplateData) -> Result<TaskTemplate, CoreError>;
    async fn find_template_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskTemplate>, CoreError>;
    /// All of the owner's templates in creation order.
    async fn find_templates_by_owner(&self, owner: Uuid) -> Result<Vec<TaskTemplate>, CoreError>;
    async fn find_templates_by_short_id_prefix(&self, owner: Uuid, short_id: &str) -> Result<Vec<TaskTemplate>, CoreError>;
}

/// Domain-specific trait for task instance operations
#[async_trait]
pub trait InstanceRepository {
    async fn add_instance(&self, owner: Uuid, data: NewInstanceData) -> Result<TaskInstance, CoreError>;
    async fn find_instance_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<TaskInstance>, CoreError>;
    /// All of the owner's instances, newest date first.
    async fn find_instances_by_owner(&self, owner: Uuid) -> Result<Vec<TaskInstance>, CoreError>;
    async fn find_instances_by_owner_and_date(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<TaskInstance>, CoreError>;
    async fn find_instances_by_short_id_prefix(&self, owner: Uuid, short_id: &str) -> Result<Vec<TaskInstance>, CoreError>;
    async fn complete_instance(&self, owner: Uuid, id: Uuid, now: DateTime<Utc>) -> Result<TaskInstance, CoreError>;
    async fn update_instance_description(&self, owner: Uuid, id: Uuid, description: Option<String>) -> Result<TaskInstance, CoreError>;
}

/// Domain-specific trait for materialization operations
#[async_trait]
pub trait MaterializationRepository {
    /// Creates today's instances for every due template, at most once per day.
    async fn materialize_today(&self, owner: Uuid, today: NaiveDate) -> Result<MaterializationSummary, CoreError>;
    /// Read-only forecast of the next `days_ahead` days, today excluded.
    async fn upcoming(&self, owner: Uuid, today: NaiveDate, days_ahead: u32) -> Result<Vec<UpcomingOccurrence>, CoreError>;
    /// Forecast horizon used when the caller does not pick one.
    fn default_upcoming_days(&self) -> u32;
}

/// Domain-specific trait for the dashboard view
#[async_trait]
pub trait DashboardRepository {
    async fn load_dashboard(&self, owner: Uuid, today: NaiveDate, days_ahead: u32) -> Result<Dashboard, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    UserRepository +
    TemplateRepository +
    InstanceRepository +
    MaterializationRepository +
    DashboardRepository
{
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    materialization_manager: MaterializationManager,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, materialization_manager: MaterializationManager) -> Self {
        Self { pool, materialization_manager }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get a reference to the materialization manager
    pub fn materialization_manager(&self) -> &MaterializationManager {
        &self.materialization_manager
    }
}

impl Repository for SqliteRepository {}

/// Keeps the entries whose id, rendered as a hyphenated UUID, starts with `short_id`.
pub(crate) fn filter_by_short_id<T>(rows: Vec<T>, short_id: &str, id: impl Fn(&T) -> Uuid) -> Vec<T> {
    let prefix = short_id.trim().to_lowercase();
    rows.into_iter()
        .filter(|row| id(row).to_string().starts_with(&prefix))
        .collect()
}
