//! API token entities for project- and environment-scoped access.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Sentinel meaning a token is valid for every project
pub const ALL_PROJECTS: &str = "*";

/// Sentinel meaning a token is valid for every environment
pub const ALL_ENVIRONMENTS: &str = "*";

/// Length of the random part of a generated secret
pub const SECRET_RANDOM_LENGTH: usize = 32;

/// Kind of access a token grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiTokenType {
    /// Full access to the admin API
    Admin,
    /// Read access for server-side SDK clients
    Client,
    /// Read access for browser and mobile SDK clients
    Frontend,
}

impl ApiTokenType {
    /// String form used in the database and in metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiTokenType::Admin => "admin",
            ApiTokenType::Client => "client",
            ApiTokenType::Frontend => "frontend",
        }
    }
}

impl fmt::Display for ApiTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiTokenType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(ApiTokenType::Admin),
            "client" => Ok(ApiTokenType::Client),
            "frontend" => Ok(ApiTokenType::Frontend),
            other => Err(DomainError::Validation {
                message: format!("Unknown API token type: {}", other),
            }),
        }
    }
}

/// API token aggregate
///
/// A token's scope along each dimension is either the wildcard sentinel
/// alone or a list of concrete identifiers, never a mix of both. The
/// `project` and `environment` fields are comma-joined projections of the
/// lists, retained for display and compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    /// Unique secret identifying the token
    pub secret: String,

    /// Name of the user or system the token was issued to
    pub username: String,

    /// Kind of access the token grants
    pub token_type: ApiTokenType,

    /// Projects the token is scoped to, or `["*"]` for unrestricted scope
    pub projects: Vec<String>,

    /// Environments the token is scoped to, or `["*"]`
    pub environments: Vec<String>,

    /// Comma-joined projection of `projects`
    pub project: String,

    /// Comma-joined projection of `environments`
    pub environment: String,

    /// Expiry instant; `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,

    /// Creation instant, assigned once at insert time
    pub created_at: DateTime<Utc>,

    /// Last time the token was used, if ever recorded
    pub seen_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Builds the stored aggregate from an insert request and the creation
    /// timestamp assigned by storage.
    ///
    /// `created_at` is the only storage-sourced field; everything else is
    /// taken from the request.
    pub fn from_create(request: ApiTokenCreate, created_at: DateTime<Utc>) -> Self {
        let projects = normalize_scope(&request.projects, ALL_PROJECTS);
        let environments = normalize_scope(&request.environments, ALL_ENVIRONMENTS);
        let project = projects.join(",");
        let environment = environments.join(",");

        Self {
            secret: request.secret,
            username: request.username,
            token_type: request.token_type,
            projects,
            environments,
            project,
            environment,
            expires_at: request.expires_at,
            created_at,
            seen_at: None,
        }
    }

    /// Checks whether the token has not expired
    ///
    /// A token with no expiry is always active.
    pub fn is_active(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at > Utc::now(),
            None => true,
        }
    }

    /// Checks whether the token is scoped to every project
    pub fn has_all_projects(&self) -> bool {
        self.projects == [ALL_PROJECTS]
    }

    /// Checks whether the token is scoped to every environment
    pub fn has_all_environments(&self) -> bool {
        self.environments == [ALL_ENVIRONMENTS]
    }
}

/// Request to create a new API token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTokenCreate {
    /// Unique secret identifying the token
    pub secret: String,

    /// Name of the user or system the token is issued to
    pub username: String,

    /// Kind of access the token grants
    pub token_type: ApiTokenType,

    /// Projects the token is scoped to; empty or containing the sentinel
    /// means unrestricted
    pub projects: Vec<String>,

    /// Environments the token is scoped to; same rule as `projects`
    pub environments: Vec<String>,

    /// Optional expiry instant
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiTokenCreate {
    /// Creates a request with unrestricted scope and no expiry
    pub fn new(
        secret: impl Into<String>,
        username: impl Into<String>,
        token_type: ApiTokenType,
    ) -> Self {
        Self {
            secret: secret.into(),
            username: username.into(),
            token_type,
            projects: Vec::new(),
            environments: Vec::new(),
            expires_at: None,
        }
    }

    /// Scopes the token to the given projects
    pub fn with_projects(mut self, projects: Vec<String>) -> Self {
        self.projects = projects;
        self
    }

    /// Scopes the token to the given environments
    pub fn with_environments(mut self, environments: Vec<String>) -> Self {
        self.environments = environments;
        self
    }

    /// Sets the expiry instant
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Collapses a raw scope list to its canonical form
///
/// An empty list or a list containing the wildcard collapses to the
/// wildcard alone; otherwise duplicates are dropped, keeping first-seen
/// order.
pub fn normalize_scope(values: &[String], wildcard: &str) -> Vec<String> {
    if values.is_empty() || values.iter().any(|v| v == wildcard) {
        return vec![wildcard.to_string()];
    }

    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !normalized.contains(value) {
            normalized.push(value.clone());
        }
    }
    normalized
}

/// Generates a new token secret of the form `{scope}:{environment}.{random}`
///
/// The scope part is the wildcard for unrestricted tokens and the joined
/// project list otherwise.
pub fn generate_secret(projects: &[String], environment: &str) -> String {
    let scope = normalize_scope(projects, ALL_PROJECTS).join(",");
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    format!("{}:{}.{}", scope, environment, random)
}
