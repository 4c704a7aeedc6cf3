//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory rule/preference storage
//! - Platform: device settings, package and usage-stats adapters
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state
//! - Launch detection: background polling worker

pub mod config;
pub mod http;
pub mod launch_detection_worker;
pub mod persistence;
pub mod platform;
pub mod state;
