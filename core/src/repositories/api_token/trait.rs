//! API token store trait defining the interface for token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::api_token::{ApiToken, ApiTokenCreate};
use crate::errors::DomainResult;

/// Repository trait for ApiToken aggregate persistence operations
///
/// This trait defines the contract for managing API tokens and their
/// project/environment scope links. Association rows are a decomposition of
/// the aggregate; implementations must never expose them independently.
///
/// # Consistency
/// - `insert` writes the token row and all link rows atomically
/// - all other operations are single statements; consistency relies on the
///   transaction guarantees of the storage layer
/// - no retries are performed at this layer
#[async_trait]
pub trait ApiTokenStore: Send + Sync {
    /// Count all stored tokens
    ///
    /// # Returns
    /// * `Ok(u64)` - Total number of token rows
    /// * `Err(DomainError)` - Database error occurred
    async fn count(&self) -> DomainResult<u64>;

    /// Fetch all tokens, aggregated from their scope links
    async fn get_all(&self) -> DomainResult<Vec<ApiToken>>;

    /// Fetch tokens that have no expiry or expire in the future
    async fn get_all_active(&self) -> DomainResult<Vec<ApiToken>>;

    /// Find a single token by its secret
    ///
    /// # Returns
    /// * `Ok(Some(ApiToken))` - Token found
    /// * `Ok(None)` - No token with the given secret; not an error
    /// * `Err(DomainError)` - Database error occurred
    ///
    /// # Example
    /// ```no_run
    /// # use fd_core::repositories::ApiTokenStore;
    /// # async fn example(store: &impl ApiTokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// match store.get("*:production.abc123").await? {
    ///     Some(token) => println!("Token for {} found", token.username),
    ///     None => println!("Token not found"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn get(&self, secret: &str) -> DomainResult<Option<ApiToken>>;

    /// Check whether a token with the given secret exists
    async fn exists(&self, secret: &str) -> DomainResult<bool>;

    /// Create a new token together with its scope links
    ///
    /// The token row and every link row commit together or not at all.
    /// Sentinel entries in the request lists produce no link rows.
    ///
    /// The returned entity is synthesized from the request: `created_at` is
    /// the only storage-sourced field, so any other storage-side default
    /// would not be reflected here.
    ///
    /// # Returns
    /// * `Ok(ApiToken)` - The created token with `created_at` populated
    /// * `Err(DomainError)` - Insert failed; nothing was written
    ///
    /// # Example
    /// ```no_run
    /// # use fd_core::domain::entities::api_token::{ApiTokenCreate, ApiTokenType};
    /// # use fd_core::repositories::ApiTokenStore;
    /// # async fn example(store: &impl ApiTokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let request = ApiTokenCreate::new("secret-1", "alice", ApiTokenType::Client)
    ///     .with_projects(vec!["p1".to_string()]);
    ///
    /// let token = store.insert(request).await?;
    /// println!("Token created at {}", token.created_at);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert(&self, request: ApiTokenCreate) -> DomainResult<ApiToken>;

    /// Delete a token by its secret
    ///
    /// Deleting an absent secret is a no-op. Link rows are removed by the
    /// storage layer's cascade.
    async fn delete(&self, secret: &str) -> DomainResult<()>;

    /// Delete every token (and, via cascade, every link row)
    async fn delete_all(&self) -> DomainResult<()>;

    /// Update a token's expiry instant
    ///
    /// # Returns
    /// * `Ok(ApiToken)` - The updated, aggregated token
    /// * `Err(DomainError::NotFound)` - No token with the given secret
    /// * `Err(DomainError)` - Database error occurred
    async fn set_expiry(&self, secret: &str, expires_at: DateTime<Utc>) -> DomainResult<ApiToken>;

    /// Record that the given tokens were just used
    ///
    /// Best-effort by contract: failures are logged and swallowed, so this
    /// never destabilizes a calling workflow. Callers cannot observe
    /// whether the update happened. Do not change this into a propagating
    /// error.
    async fn mark_seen_at(&self, secrets: &[String]);
}
