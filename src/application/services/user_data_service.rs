use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::ports::outbound::{UserDataError, UserDataRepositoryPort};
use crate::domain::value_objects::UserData;

pub struct UserDataService {
    repository: Arc<dyn UserDataRepositoryPort>,
    cache: RwLock<Option<UserData>>,
}

impl UserDataService {
    pub fn new(repository: Arc<dyn UserDataRepositoryPort>) -> Self {
        Self {
            repository,
            cache: RwLock::new(None),
        }
    }

    /// Get current preferences (cached)
    pub async fn get(&self) -> UserData {
        if let Some(user_data) = *self.cache.read().await {
            return user_data;
        }

        // Load from DB
        match self.repository.get().await {
            Ok(user_data) => {
                *self.cache.write().await = Some(user_data);
                user_data
            }
            Err(e) => {
                tracing::warn!("Falling back to default user data: {}", e);
                UserData::from_env()
            }
        }
    }

    /// Update preferences and refresh cache
    pub async fn update(&self, user_data: UserData) -> Result<(), UserDataError> {
        self.repository.save(&user_data).await?;
        *self.cache.write().await = Some(user_data);
        Ok(())
    }

    pub async fn set_auto_launch(&self, use_auto_launch: bool) -> Result<UserData, UserDataError> {
        let user_data = UserData {
            use_auto_launch,
            ..self.get().await
        };
        self.update(user_data).await?;
        Ok(user_data)
    }

    pub async fn set_usage_stats_service(&self, use_usage_stats_service: bool) -> Result<UserData, UserDataError> {
        let user_data = UserData {
            use_usage_stats_service,
            ..self.get().await
        };
        self.update(user_data).await?;
        Ok(user_data)
    }

    /// Reset to env/defaults and clear DB values
    pub async fn reset(&self) -> Result<UserData, UserDataError> {
        let user_data = self.repository.reset().await?;
        *self.cache.write().await = Some(user_data);
        Ok(user_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryUserDataRepository;

    #[tokio::test]
    async fn test_setters_keep_other_preferences() {
        let service = UserDataService::new(Arc::new(InMemoryUserDataRepository::new()));

        service.set_auto_launch(true).await.unwrap();
        let user_data = service.set_usage_stats_service(true).await.unwrap();

        assert!(user_data.use_auto_launch);
        assert!(user_data.use_usage_stats_service);
        assert_eq!(service.get().await, user_data);
    }

    #[tokio::test]
    async fn test_reset_refreshes_cache() {
        let service = UserDataService::new(Arc::new(InMemoryUserDataRepository::new()));
        service
            .update(UserData {
                use_auto_launch: true,
                use_usage_stats_service: true,
            })
            .await
            .unwrap();

        let reset = service.reset().await.unwrap();

        assert_eq!(reset, UserData::from_env());
        assert_eq!(service.get().await, UserData::from_env());
    }
}
