use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::application::ports::outbound::{UserDataError, UserDataRepositoryPort};
use crate::domain::value_objects::UserData;

/// Preferences stored as a single row; an absent row means env defaults
pub struct SqliteUserDataRepository {
    pool: SqlitePool,
}

impl SqliteUserDataRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS user_data (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                use_auto_launch INTEGER NOT NULL,
                use_usage_stats_service INTEGER NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        "#).execute(&pool).await?;

        Ok(Self { pool })
    }
}

fn db_error(e: sqlx::Error) -> UserDataError {
    UserDataError::Database(e.to_string())
}

#[async_trait]
impl UserDataRepositoryPort for SqliteUserDataRepository {
    async fn get(&self) -> Result<UserData, UserDataError> {
        let row: Option<(bool, bool)> = sqlx::query_as(
            "SELECT use_auto_launch, use_usage_stats_service FROM user_data WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(match row {
            Some((use_auto_launch, use_usage_stats_service)) => UserData {
                use_auto_launch,
                use_usage_stats_service,
            },
            None => UserData::from_env(),
        })
    }

    async fn save(&self, user_data: &UserData) -> Result<(), UserDataError> {
        sqlx::query(
            "INSERT INTO user_data (id, use_auto_launch, use_usage_stats_service) VALUES (1, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET use_auto_launch = excluded.use_auto_launch, \
             use_usage_stats_service = excluded.use_usage_stats_service, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(user_data.use_auto_launch)
        .bind(user_data.use_usage_stats_service)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn reset(&self) -> Result<UserData, UserDataError> {
        sqlx::query("DELETE FROM user_data")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(UserData::from_env())
    }
}
