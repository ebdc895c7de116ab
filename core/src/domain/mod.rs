//! Domain layer containing business entities and the token aggregation logic.

pub mod aggregation;
pub mod entities;

// Re-export commonly used domain types
pub use aggregation::*;
pub use entities::*;
