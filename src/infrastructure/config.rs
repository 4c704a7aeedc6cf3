//! Application configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where rules and preferences are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

/// What settings, package and usage queries talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformBackend {
    /// The device shell tools
    Device,
    /// In-process tables, for dry runs off-device
    Memory,
}

impl FromStr for PlatformBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "device" => Ok(Self::Device),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown platform backend: {}", other),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub platform_backend: PlatformBackend,

    /// Package the secure settings permission must be granted to
    pub app_package_name: String,

    /// Binary providing `settings` and `package` subcommands
    pub settings_command: String,
    /// Binary used to read the resumed activity
    pub dumpsys_command: String,

    /// Delay between usage-stats polls
    pub usage_poll_interval: Duration,

    /// HTTP server port
    pub server_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://app_settings.db?mode=rwc".to_string()),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "sqlite".to_string())
                .parse()
                .context("STORAGE_BACKEND must be 'sqlite' or 'memory'")?,
            platform_backend: env::var("PLATFORM_BACKEND")
                .unwrap_or_else(|_| "device".to_string())
                .parse()
                .context("PLATFORM_BACKEND must be 'device' or 'memory'")?,

            app_package_name: env::var("APP_PACKAGE_NAME")
                .unwrap_or_else(|_| "com.example.appsettings".to_string()),

            settings_command: env::var("SETTINGS_COMMAND").unwrap_or_else(|_| "cmd".to_string()),
            dumpsys_command: env::var("DUMPSYS_COMMAND").unwrap_or_else(|_| "dumpsys".to_string()),

            usage_poll_interval: Duration::from_millis(
                env::var("USAGE_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("USAGE_POLL_INTERVAL_MS must be a number of milliseconds")?,
            ),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}
