use async_trait::async_trait;

use crate::domain::value_objects::UserData;

#[derive(Debug, thiserror::Error)]
pub enum UserDataError {
    #[error("Database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait UserDataRepositoryPort: Send + Sync {
    async fn get(&self) -> Result<UserData, UserDataError>;
    async fn save(&self, user_data: &UserData) -> Result<(), UserDataError>;
    async fn reset(&self) -> Result<UserData, UserDataError>;
}
