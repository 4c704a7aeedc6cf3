//! Persistence adapters
//!
//! SQLite is the default backend; the in-memory variants back dry runs
//! (`STORAGE_BACKEND=memory`) and tests.

mod memory_app_setting_repository;
mod memory_user_data_repository;
mod sqlite_app_setting_repository;
mod sqlite_user_data_repository;

pub use memory_app_setting_repository::InMemoryAppSettingRepository;
pub use memory_user_data_repository::InMemoryUserDataRepository;
pub use sqlite_app_setting_repository::SqliteAppSettingRepository;
pub use sqlite_user_data_repository::SqliteUserDataRepository;
