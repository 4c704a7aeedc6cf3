//! In-process stand-ins for the device

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::application::ports::outbound::{
    PackageError, PackagePort, SettingsStoreError, SettingsStorePort, UsageStatsError,
    UsageStatsPort, WriteOutcome,
};
use crate::domain::value_objects::{SecureSetting, SettingType, UsageEvent};

/// Settings tables held in memory.
///
/// Secure and global writes are refused unless the secure permission has been
/// granted, mirroring an app without `WRITE_SECURE_SETTINGS`.
pub struct InMemorySettingsStore {
    values: RwLock<BTreeMap<(SettingType, String), String>>,
    secure_permission: AtomicBool,
    rejected_keys: RwLock<HashSet<String>>,
    unavailable: AtomicBool,
    writes: Mutex<Vec<(SettingType, String, String)>>,
}

impl InMemorySettingsStore {
    pub fn new(secure_permission: bool) -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            secure_permission: AtomicBool::new(secure_permission),
            rejected_keys: RwLock::new(HashSet::new()),
            unavailable: AtomicBool::new(false),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn set_secure_permission(&self, granted: bool) {
        self.secure_permission.store(granted, Ordering::SeqCst);
    }

    /// Make every later write to `key` fail as an invalid value
    pub async fn reject_key(&self, key: impl Into<String>) {
        self.rejected_keys.write().await.insert(key.into());
    }

    /// Make every later call fail with an unclassified error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn value(&self, setting_type: SettingType, key: &str) -> Option<String> {
        self.values
            .read()
            .await
            .get(&(setting_type, key.to_string()))
            .cloned()
    }

    /// Accepted writes in the order they were applied
    pub async fn writes(&self) -> Vec<(SettingType, String, String)> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl SettingsStorePort for InMemorySettingsStore {
    async fn put(
        &self,
        setting_type: SettingType,
        key: &str,
        value: &str,
    ) -> Result<WriteOutcome, SettingsStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SettingsStoreError::Unavailable("settings store offline".to_string()));
        }
        if setting_type.requires_secure_permission() && !self.secure_permission.load(Ordering::SeqCst) {
            return Ok(WriteOutcome::PermissionDenied);
        }
        if key.trim().is_empty() || self.rejected_keys.read().await.contains(key) {
            return Ok(WriteOutcome::InvalidValue);
        }

        self.values
            .write()
            .await
            .insert((setting_type, key.to_string()), value.to_string());
        self.writes
            .lock()
            .await
            .push((setting_type, key.to_string(), value.to_string()));
        Ok(WriteOutcome::Applied)
    }

    async fn list(&self, setting_type: SettingType) -> Result<Vec<SecureSetting>, SettingsStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SettingsStoreError::Unavailable("settings store offline".to_string()));
        }

        // BTreeMap iteration already yields names in order within a namespace
        Ok(self
            .values
            .read()
            .await
            .iter()
            .filter(|((kind, _), _)| *kind == setting_type)
            .map(|((_, name), value)| SecureSetting {
                setting_type,
                id: None,
                name: Some(name.clone()),
                value: Some(value.clone()),
            })
            .collect())
    }
}

/// Usage events queued by hand and drained on every poll
pub struct InMemoryUsageStats {
    pending: Mutex<VecDeque<UsageEvent>>,
    permission: AtomicBool,
}

impl InMemoryUsageStats {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            permission: AtomicBool::new(true),
        }
    }

    pub async fn push(&self, event: UsageEvent) {
        self.pending.lock().await.push_back(event);
    }

    pub fn set_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::SeqCst);
    }
}

impl Default for InMemoryUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageStatsPort for InMemoryUsageStats {
    async fn query_events(&self) -> Result<Vec<UsageEvent>, UsageStatsError> {
        Ok(self.pending.lock().await.drain(..).collect())
    }

    async fn is_permission_granted(&self) -> bool {
        self.permission.load(Ordering::SeqCst)
    }
}

/// Fixed list of installed packages
pub struct InMemoryPackageSource {
    packages: RwLock<Vec<String>>,
}

impl InMemoryPackageSource {
    pub fn new(packages: Vec<String>) -> Self {
        Self {
            packages: RwLock::new(packages),
        }
    }

    pub async fn set_packages(&self, packages: Vec<String>) {
        *self.packages.write().await = packages;
    }
}

#[async_trait]
impl PackagePort for InMemoryPackageSource {
    async fn installed_package_names(&self) -> Result<Vec<String>, PackageError> {
        Ok(self.packages.read().await.clone())
    }
}
