//! Configuration module
//!
//! Configuration is organized by concern; each sub-module owns the settings
//! for one infrastructure dependency:
//! - `database` - Database connection and pool configuration

pub mod database;

// Re-export commonly used types
pub use database::DatabaseConfig;
