use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{UserDataError, UserDataRepositoryPort};
use crate::domain::value_objects::UserData;

/// Preferences kept only for the lifetime of the process
pub struct InMemoryUserDataRepository {
    user_data: RwLock<Option<UserData>>,
}

impl InMemoryUserDataRepository {
    pub fn new() -> Self {
        Self {
            user_data: RwLock::new(None),
        }
    }
}

impl Default for InMemoryUserDataRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDataRepositoryPort for InMemoryUserDataRepository {
    async fn get(&self) -> Result<UserData, UserDataError> {
        Ok(self.user_data.read().await.unwrap_or_else(UserData::from_env))
    }

    async fn save(&self, user_data: &UserData) -> Result<(), UserDataError> {
        *self.user_data.write().await = Some(*user_data);
        Ok(())
    }

    async fn reset(&self) -> Result<UserData, UserDataError> {
        *self.user_data.write().await = None;
        Ok(UserData::from_env())
    }
}
