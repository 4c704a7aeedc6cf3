//! In-memory rule storage, used for dry runs and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};

use crate::application::ports::outbound::{AppSettingRepositoryPort, RepositoryError};
use crate::domain::entities::AppSetting;
use crate::domain::value_objects::AppSettingId;

pub struct InMemoryAppSettingRepository {
    rows: RwLock<Rows>,
    changes: watch::Sender<u64>,
}

#[derive(Default)]
struct Rows {
    next_id: i64,
    by_id: BTreeMap<i64, AppSetting>,
}

impl InMemoryAppSettingRepository {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            rows: RwLock::new(Rows {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
            changes,
        }
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

impl Default for InMemoryAppSettingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppSettingRepositoryPort for InMemoryAppSettingRepository {
    async fn upsert(&self, app_setting: &AppSetting) -> Result<AppSetting, RepositoryError> {
        let mut rows = self.rows.write().await;

        let existing = match app_setting.id {
            Some(id) => Some(id.as_i64()),
            None => rows
                .by_id
                .iter()
                .find(|(_, row)| {
                    row.package_name == app_setting.package_name
                        && row.setting_type == app_setting.setting_type
                        && row.key == app_setting.key
                })
                .map(|(id, _)| *id),
        };

        let id = match existing {
            Some(id) => id,
            None => {
                let id = rows.next_id;
                rows.next_id += 1;
                id
            }
        };
        if id >= rows.next_id {
            rows.next_id = id + 1;
        }

        let stored = app_setting.clone().with_id(AppSettingId::from_i64(id));
        rows.by_id.insert(id, stored.clone());
        drop(rows);

        self.notify();
        Ok(stored)
    }

    async fn delete(&self, app_setting: &AppSetting) -> Result<(), RepositoryError> {
        let Some(id) = app_setting.id else {
            return Ok(());
        };
        let removed = self.rows.write().await.by_id.remove(&id.as_i64());
        if removed.is_some() {
            self.notify();
        }
        Ok(())
    }

    async fn get_by_id(&self, id: AppSettingId) -> Result<Option<AppSetting>, RepositoryError> {
        Ok(self.rows.read().await.by_id.get(&id.as_i64()).cloned())
    }

    async fn get_by_package_name(&self, package_name: &str) -> Result<Vec<AppSetting>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows
            .by_id
            .values()
            .filter(|row| row.package_name == package_name)
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<AppSetting>, RepositoryError> {
        Ok(self.rows.read().await.by_id.values().cloned().collect())
    }

    async fn delete_by_package_names(&self, package_names: &[String]) -> Result<u64, RepositoryError> {
        let mut rows = self.rows.write().await;
        let before = rows.by_id.len();
        rows.by_id
            .retain(|_, row| !package_names.iter().any(|name| *name == row.package_name));
        let removed = (before - rows.by_id.len()) as u64;
        drop(rows);

        if removed > 0 {
            self.notify();
        }
        Ok(removed)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
