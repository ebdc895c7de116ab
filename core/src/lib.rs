//! # FlagDeck Core
//!
//! Core domain layer for the FlagDeck backend.
//! This crate contains domain entities, the token row aggregation logic,
//! repository interfaces, and error types that form the foundation of the
//! application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
