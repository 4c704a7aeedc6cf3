//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: AppSetting rules owned by a target package
//! - Value Objects: setting namespaces, outcome codes, user preferences,
//!   usage events and identifiers

pub mod entities;
pub mod value_objects;
