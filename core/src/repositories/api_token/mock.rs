//! Mock implementation of ApiTokenStore for testing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::api_token::{ApiToken, ApiTokenCreate};
use crate::errors::{DomainError, DomainResult};

use super::r#trait::ApiTokenStore;

/// Mock API token store for testing
///
/// Keeps insertion order so reads behave like the aggregated join reads of
/// the real store. `poison` makes every storage interaction fail, which is
/// how the best-effort contract of `mark_seen_at` gets exercised.
pub struct MockApiTokenStore {
    tokens: Arc<RwLock<Vec<ApiToken>>>,
    poisoned: AtomicBool,
}

impl MockApiTokenStore {
    /// Create a new mock store
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(Vec::new())),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Make every subsequent storage interaction fail
    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::SeqCst);
    }

    fn check_poisoned(&self) -> DomainResult<()> {
        if self.poisoned.load(Ordering::SeqCst) {
            Err(DomainError::Internal {
                message: "storage unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for MockApiTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTokenStore for MockApiTokenStore {
    async fn count(&self) -> DomainResult<u64> {
        self.check_poisoned()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.len() as u64)
    }

    async fn get_all(&self) -> DomainResult<Vec<ApiToken>> {
        self.check_poisoned()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.clone())
    }

    async fn get_all_active(&self) -> DomainResult<Vec<ApiToken>> {
        self.check_poisoned()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().filter(|t| t.is_active()).cloned().collect())
    }

    async fn get(&self, secret: &str) -> DomainResult<Option<ApiToken>> {
        self.check_poisoned()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.secret == secret).cloned())
    }

    async fn exists(&self, secret: &str) -> DomainResult<bool> {
        self.check_poisoned()?;
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().any(|t| t.secret == secret))
    }

    async fn insert(&self, request: ApiTokenCreate) -> DomainResult<ApiToken> {
        self.check_poisoned()?;
        let mut tokens = self.tokens.write().await;

        // Check for duplicate
        if tokens.iter().any(|t| t.secret == request.secret) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        let token = ApiToken::from_create(request, Utc::now());
        tokens.push(token.clone());
        Ok(token)
    }

    async fn delete(&self, secret: &str) -> DomainResult<()> {
        self.check_poisoned()?;
        let mut tokens = self.tokens.write().await;
        tokens.retain(|t| t.secret != secret);
        Ok(())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        self.check_poisoned()?;
        let mut tokens = self.tokens.write().await;
        tokens.clear();
        Ok(())
    }

    async fn set_expiry(&self, secret: &str, expires_at: DateTime<Utc>) -> DomainResult<ApiToken> {
        self.check_poisoned()?;
        let mut tokens = self.tokens.write().await;

        match tokens.iter_mut().find(|t| t.secret == secret) {
            Some(token) => {
                token.expires_at = Some(expires_at);
                Ok(token.clone())
            }
            None => Err(DomainError::NotFound {
                resource: format!("api token '{}'", secret),
            }),
        }
    }

    async fn mark_seen_at(&self, secrets: &[String]) {
        if let Err(e) = self.check_poisoned() {
            tracing::error!("Failed to update seen_at for api tokens: {}", e);
            return;
        }

        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        for token in tokens.iter_mut() {
            if secrets.contains(&token.secret) {
                token.seen_at = Some(now);
            }
        }
    }
}
