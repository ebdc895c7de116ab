//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the FlagDeck backend,
//! following Clean Architecture principles. It provides the concrete store
//! implementations and the plumbing around them.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL implementations of the core store traits using SQLx
//! - **Metrics**: Prometheus timers bracketing every store operation

// Re-export core types for convenience
pub use fd_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Metrics module - store operation timers
pub mod metrics;

/// Load database configuration from the environment
///
/// Reads a `.env` file first if one is present.
pub fn load_database_config() -> fd_shared::config::DatabaseConfig {
    dotenvy::dotenv().ok();
    fd_shared::config::DatabaseConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
