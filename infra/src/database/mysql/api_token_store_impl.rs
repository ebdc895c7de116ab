//! MySQL implementation of the ApiTokenStore trait.
//!
//! This module provides the concrete implementation of API token
//! persistence using MySQL with SQLx. Tokens live in three tables: the
//! scalar token row plus one link table per scope dimension. Reads join
//! all three and fold the flat rows back into aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, QueryBuilder, Row};

use fd_core::domain::aggregation::{aggregate_rows, ApiTokenRow};
use fd_core::domain::entities::api_token::{
    ApiToken, ApiTokenCreate, ALL_ENVIRONMENTS, ALL_PROJECTS,
};
use fd_core::errors::{DomainError, DomainResult};
use fd_core::repositories::ApiTokenStore;

use crate::metrics::store_operation_timer;

/// Store name used in metrics labels
const STORE: &str = "api-tokens";

/// Left-outer join feeding the row aggregator; every read except
/// `count`/`exists` goes through this shape.
const TOKEN_JOIN_QUERY: &str = "\
    SELECT t.secret, t.username, t.token_type, t.expires_at, t.created_at, t.seen_at, \
           p.project, e.environment \
    FROM api_tokens t \
    LEFT JOIN api_token_project p ON t.secret = p.secret \
    LEFT JOIN api_token_environment e ON t.secret = e.secret";

/// MySQL implementation of ApiTokenStore
pub struct MySqlApiTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlApiTokenStore {
    /// Create a new MySQL API token store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row of the token join to an ApiTokenRow
    fn row_to_token_row(row: &sqlx::mysql::MySqlRow) -> Result<ApiTokenRow, DomainError> {
        let token_type: String = row.try_get("token_type").map_err(|e| DomainError::Internal {
            message: format!("Failed to get token_type: {}", e),
        })?;

        Ok(ApiTokenRow {
            secret: row.try_get("secret").map_err(|e| DomainError::Internal {
                message: format!("Failed to get secret: {}", e),
            })?,
            username: row.try_get("username").map_err(|e| DomainError::Internal {
                message: format!("Failed to get username: {}", e),
            })?,
            token_type: token_type.parse()?,
            expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            seen_at: row
                .try_get::<Option<DateTime<Utc>>, _>("seen_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get seen_at: {}", e),
                })?,
            project: row.try_get("project").map_err(|e| DomainError::Internal {
                message: format!("Failed to get project: {}", e),
            })?,
            environment: row
                .try_get("environment")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get environment: {}", e),
                })?,
        })
    }

    /// Fold raw join rows into aggregated tokens
    fn aggregate(rows: Vec<sqlx::mysql::MySqlRow>) -> DomainResult<Vec<ApiToken>> {
        let mut token_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            token_rows.push(Self::row_to_token_row(row)?);
        }
        Ok(aggregate_rows(token_rows))
    }

    /// Fetch one aggregated token by secret, without timing
    ///
    /// Shared by `get` and `set_expiry`; each public caller carries its own
    /// operation timer.
    async fn fetch_aggregated(&self, secret: &str) -> DomainResult<Option<ApiToken>> {
        let query = format!("{} WHERE t.secret = ?", TOKEN_JOIN_QUERY);

        let rows = sqlx::query(&query)
            .bind(secret)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to fetch api token: {}", e),
            })?;

        Ok(Self::aggregate(rows)?.into_iter().next())
    }
}

#[async_trait]
impl ApiTokenStore for MySqlApiTokenStore {
    async fn count(&self) -> DomainResult<u64> {
        let _timer = store_operation_timer(STORE, "count");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to count api tokens: {}", e),
            })?;

        Ok(count as u64)
    }

    async fn get_all(&self) -> DomainResult<Vec<ApiToken>> {
        let _timer = store_operation_timer(STORE, "get_all");

        let rows = sqlx::query(TOKEN_JOIN_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to fetch api tokens: {}", e),
            })?;

        Self::aggregate(rows)
    }

    async fn get_all_active(&self) -> DomainResult<Vec<ApiToken>> {
        let _timer = store_operation_timer(STORE, "get_all_active");

        let query = format!(
            "{} WHERE t.expires_at IS NULL OR t.expires_at > ?",
            TOKEN_JOIN_QUERY
        );

        let rows = sqlx::query(&query)
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to fetch active api tokens: {}", e),
            })?;

        Self::aggregate(rows)
    }

    async fn get(&self, secret: &str) -> DomainResult<Option<ApiToken>> {
        let _timer = store_operation_timer(STORE, "get");
        self.fetch_aggregated(secret).await
    }

    async fn exists(&self, secret: &str) -> DomainResult<bool> {
        let _timer = store_operation_timer(STORE, "exists");

        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM api_tokens WHERE secret = ?) AS present")
            .bind(secret)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to check api token existence: {}", e),
            })?;

        let present: i8 = row.try_get("present").map_err(|e| DomainError::Internal {
            message: format!("Failed to get existence result: {}", e),
        })?;

        Ok(present == 1)
    }

    async fn insert(&self, request: ApiTokenCreate) -> DomainResult<ApiToken> {
        let _timer = store_operation_timer(STORE, "insert");

        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to begin transaction: {}", e),
        })?;

        sqlx::query(
            "INSERT INTO api_tokens (secret, username, token_type, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.secret)
        .bind(&request.username)
        .bind(request.token_type.as_str())
        .bind(request.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to insert api token: {}", e),
        })?;

        // created_at comes from the column default; capture it inside the
        // transaction for the synthesized return value
        let created_at: DateTime<Utc> =
            sqlx::query_scalar("SELECT created_at FROM api_tokens WHERE secret = ?")
                .bind(&request.secret)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to read back created_at: {}", e),
                })?;

        // Sentinel entries produce no link rows; wildcard scope is the
        // absence of links
        for project in request.projects.iter().filter(|p| p.as_str() != ALL_PROJECTS) {
            sqlx::query("INSERT INTO api_token_project (secret, project) VALUES (?, ?)")
                .bind(&request.secret)
                .bind(project)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to insert project link: {}", e),
                })?;
        }

        for environment in request
            .environments
            .iter()
            .filter(|e| e.as_str() != ALL_ENVIRONMENTS)
        {
            sqlx::query("INSERT INTO api_token_environment (secret, environment) VALUES (?, ?)")
                .bind(&request.secret)
                .bind(environment)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to insert environment link: {}", e),
                })?;
        }

        // Token row and all link rows commit together or not at all
        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit api token insert: {}", e),
        })?;

        Ok(ApiToken::from_create(request, created_at))
    }

    async fn delete(&self, secret: &str) -> DomainResult<()> {
        let _timer = store_operation_timer(STORE, "delete");

        // Link rows go with the token row via FK cascade; deleting an
        // absent secret is a no-op
        sqlx::query("DELETE FROM api_tokens WHERE secret = ?")
            .bind(secret)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete api token: {}", e),
            })?;

        Ok(())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        let _timer = store_operation_timer(STORE, "delete_all");

        sqlx::query("DELETE FROM api_tokens")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete api tokens: {}", e),
            })?;

        Ok(())
    }

    async fn set_expiry(&self, secret: &str, expires_at: DateTime<Utc>) -> DomainResult<ApiToken> {
        let _timer = store_operation_timer(STORE, "set_expiry");

        let result = sqlx::query("UPDATE api_tokens SET expires_at = ? WHERE secret = ?")
            .bind(expires_at)
            .bind(secret)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update api token expiry: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("api token '{}'", secret),
            });
        }

        self.fetch_aggregated(secret)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("api token '{}'", secret),
            })
    }

    async fn mark_seen_at(&self, secrets: &[String]) {
        let _timer = store_operation_timer(STORE, "mark_seen_at");

        if secrets.is_empty() {
            return;
        }

        let mut builder: QueryBuilder<sqlx::MySql> =
            QueryBuilder::new("UPDATE api_tokens SET seen_at = ");
        builder.push_bind(Utc::now());
        builder.push(" WHERE secret IN (");
        let mut separated = builder.separated(", ");
        for secret in secrets {
            separated.push_bind(secret);
        }
        builder.push(")");

        // Best-effort by contract: a failed seen_at update must never
        // destabilize the calling workflow
        if let Err(e) = builder.build().execute(&self.pool).await {
            tracing::error!("Failed to update seen_at for api tokens: {}", e);
        }
    }
}
