use crate::error::CoreError;
use crate::models::User;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::UserRepository for SqliteRepository {
    async fn add_user(&self, username: &str) -> Result<User, CoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CoreError::InvalidInput("Username cannot be empty".to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, username, created_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.username)
            .bind(user.created_at)
            .execute(self.pool())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    CoreError::AlreadyExists(format!("User '{}'", username))
                }
                other => CoreError::Database(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username.trim())
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_users(&self) -> Result<Vec<User>, CoreError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY username")
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }
}
