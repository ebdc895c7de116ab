//! Shared utilities and common types for the FlagDeck backend
//!
//! This crate provides configuration types used across the server crates.

pub mod config;

// Re-export commonly used items at crate root
pub use config::DatabaseConfig;
