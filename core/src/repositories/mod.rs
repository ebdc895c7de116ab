pub mod api_token;

pub use api_token::ApiTokenStore;

#[cfg(test)]
pub use api_token::MockApiTokenStore;
