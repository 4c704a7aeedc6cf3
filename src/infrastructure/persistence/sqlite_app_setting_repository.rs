use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::watch;

use crate::application::ports::outbound::{AppSettingRepositoryPort, RepositoryError};
use crate::domain::entities::AppSetting;
use crate::domain::value_objects::{AppSettingId, SettingType};

const SELECT_COLUMNS: &str = "SELECT id, enabled, setting_type, package_name, label, key, value_on_launch, value_on_revert FROM app_settings";

pub struct SqliteAppSettingRepository {
    pool: SqlitePool,
    changes: watch::Sender<u64>,
}

impl SqliteAppSettingRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS app_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                enabled INTEGER NOT NULL,
                setting_type TEXT NOT NULL,
                package_name TEXT NOT NULL,
                label TEXT NOT NULL,
                key TEXT NOT NULL,
                value_on_launch TEXT NOT NULL,
                value_on_revert TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        "#).execute(&pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_app_settings_package_name ON app_settings (package_name)")
            .execute(&pool)
            .await?;

        let (changes, _) = watch::channel(0);
        Ok(Self { pool, changes })
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_app_setting(row: &SqliteRow) -> Result<AppSetting, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(db_error)?;
    let setting_type: String = row.try_get("setting_type").map_err(db_error)?;
    let setting_type = setting_type
        .parse::<SettingType>()
        .map_err(|e| RepositoryError::CorruptRow {
            id,
            reason: e.to_string(),
        })?;

    Ok(AppSetting {
        id: Some(AppSettingId::from_i64(id)),
        enabled: row.try_get("enabled").map_err(db_error)?,
        setting_type,
        package_name: row.try_get("package_name").map_err(db_error)?,
        label: row.try_get("label").map_err(db_error)?,
        key: row.try_get("key").map_err(db_error)?,
        value_on_launch: row.try_get("value_on_launch").map_err(db_error)?,
        value_on_revert: row.try_get("value_on_revert").map_err(db_error)?,
    })
}

#[async_trait]
impl AppSettingRepositoryPort for SqliteAppSettingRepository {
    async fn upsert(&self, app_setting: &AppSetting) -> Result<AppSetting, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let existing: Option<i64> = match app_setting.id {
            Some(id) => sqlx::query_scalar("SELECT id FROM app_settings WHERE id = ?")
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?,
            None => sqlx::query_scalar(
                "SELECT id FROM app_settings WHERE package_name = ? AND setting_type = ? AND key = ? ORDER BY id LIMIT 1",
            )
            .bind(&app_setting.package_name)
            .bind(app_setting.setting_type.as_str())
            .bind(&app_setting.key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?,
        };

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE app_settings SET enabled = ?, setting_type = ?, package_name = ?, label = ?, key = ?, value_on_launch = ?, value_on_revert = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                )
                .bind(app_setting.enabled)
                .bind(app_setting.setting_type.as_str())
                .bind(&app_setting.package_name)
                .bind(&app_setting.label)
                .bind(&app_setting.key)
                .bind(&app_setting.value_on_launch)
                .bind(&app_setting.value_on_revert)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
                id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO app_settings (id, enabled, setting_type, package_name, label, key, value_on_launch, value_on_revert) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(app_setting.id.map(|id| id.as_i64()))
                .bind(app_setting.enabled)
                .bind(app_setting.setting_type.as_str())
                .bind(&app_setting.package_name)
                .bind(&app_setting.label)
                .bind(&app_setting.key)
                .bind(&app_setting.value_on_launch)
                .bind(&app_setting.value_on_revert)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
                result.last_insert_rowid()
            }
        };

        tx.commit().await.map_err(db_error)?;
        self.notify();

        Ok(app_setting.clone().with_id(AppSettingId::from_i64(id)))
    }

    async fn delete(&self, app_setting: &AppSetting) -> Result<(), RepositoryError> {
        let Some(id) = app_setting.id else {
            return Ok(());
        };

        let result = sqlx::query("DELETE FROM app_settings WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() > 0 {
            self.notify();
        }
        Ok(())
    }

    async fn get_by_id(&self, id: AppSettingId) -> Result<Option<AppSetting>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_app_setting).transpose()
    }

    async fn get_by_package_name(&self, package_name: &str) -> Result<Vec<AppSetting>, RepositoryError> {
        let rows = sqlx::query(&format!("{} WHERE package_name = ? ORDER BY id", SELECT_COLUMNS))
            .bind(package_name)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_app_setting).collect()
    }

    async fn get_all(&self) -> Result<Vec<AppSetting>, RepositoryError> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_app_setting).collect()
    }

    async fn delete_by_package_names(&self, package_names: &[String]) -> Result<u64, RepositoryError> {
        if package_names.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut removed = 0;
        for package_name in package_names {
            removed += sqlx::query("DELETE FROM app_settings WHERE package_name = ?")
                .bind(package_name)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?
                .rows_affected();
        }
        tx.commit().await.map_err(db_error)?;

        if removed > 0 {
            self.notify();
        }
        Ok(removed)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repository() -> SqliteAppSettingRepository {
        // a single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteAppSettingRepository::new(pool).await.unwrap()
    }

    fn rule(key: &str) -> AppSetting {
        AppSetting::new("com.example.app", SettingType::Secure, key, "1", "0").with_label("Label")
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let repository = repository().await;
        let original = rule("k").with_enabled(false);

        let stored = repository.upsert(&original).await.unwrap();
        let read = repository.get_by_package_name("com.example.app").await.unwrap();

        assert_eq!(read.len(), 1);
        assert!(read[0].id.is_some());
        assert_eq!(read[0].id, stored.id);
        assert!(read[0].same_content(&original));
    }

    #[tokio::test]
    async fn test_upsert_same_key_overwrites_label() {
        let repository = repository().await;
        repository.upsert(&rule("k").with_label("A")).await.unwrap();
        repository.upsert(&rule("k").with_label("B")).await.unwrap();

        let read = repository.get_by_package_name("com.example.app").await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].label, "B");
    }

    #[tokio::test]
    async fn test_upsert_by_id_updates_in_place() {
        let repository = repository().await;
        let stored = repository.upsert(&rule("k")).await.unwrap();

        let mut toggled = stored.clone();
        toggled.enabled = false;
        toggled.value_on_launch = "2".to_string();
        repository.upsert(&toggled).await.unwrap();

        let read = repository.get_all().await.unwrap();
        assert_eq!(read, vec![toggled]);
    }

    #[tokio::test]
    async fn test_delete_removes_rule_and_ignores_absent() {
        let repository = repository().await;
        let stored = repository.upsert(&rule("k")).await.unwrap();
        repository.upsert(&rule("other")).await.unwrap();

        repository.delete(&stored).await.unwrap();
        repository.delete(&stored).await.unwrap();

        let read = repository.get_by_package_name("com.example.app").await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].key, "other");
    }

    #[tokio::test]
    async fn test_delete_by_package_names_only_touches_named_packages() {
        let repository = repository().await;
        repository.upsert(&rule("k")).await.unwrap();
        repository
            .upsert(&AppSetting::new("com.example.gone", SettingType::System, "k", "1", "0"))
            .await
            .unwrap();
        repository
            .upsert(&AppSetting::new("com.example.gone", SettingType::Global, "j", "1", "0"))
            .await
            .unwrap();

        let removed = repository
            .delete_by_package_names(&["com.example.gone".to_string()])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        let remaining = repository.get_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].package_name, "com.example.app");
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let repository = repository().await;
        let mut changes = repository.subscribe();

        repository.upsert(&rule("k")).await.unwrap();

        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();
        assert!(!changes.has_changed().unwrap());
    }
}
