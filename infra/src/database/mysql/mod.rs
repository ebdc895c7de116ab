//! MySQL-specific database implementations
//!
//! This module contains MySQL implementations of the core store traits
//! using SQLx for database operations.

pub mod api_token_store_impl;

// Re-export the MySQL implementations
pub use api_token_store_impl::MySqlApiTokenStore;
