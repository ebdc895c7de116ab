//! Domain entities representing core business objects.

pub mod api_token;

// Re-export commonly used types
pub use api_token::{
    ApiToken, ApiTokenCreate, ApiTokenType,
    ALL_ENVIRONMENTS, ALL_PROJECTS, SECRET_RANDOM_LENGTH,
};
