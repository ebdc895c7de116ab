//! Aggregation of flat token join rows into domain objects.
//!
//! Reads of the token tables produce one row per token × project-link ×
//! environment-link combination. This module folds those rows back into one
//! `ApiToken` per secret, applying the wildcard defaults when a dimension
//! has no explicit links.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::entities::api_token::{
    ApiToken, ApiTokenType, ALL_ENVIRONMENTS, ALL_PROJECTS,
};

/// One flat row of the token join
///
/// Carries the scalar token columns plus at most one project link and at
/// most one environment link; either link may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiTokenRow {
    pub secret: String,
    pub username: String,
    pub token_type: ApiTokenType,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub seen_at: Option<DateTime<Utc>>,
    pub project: Option<String>,
    pub environment: Option<String>,
}

/// Folds join rows into one `ApiToken` per distinct secret.
///
/// Tokens come out in the order their secrets were first encountered. Each
/// scope dimension starts as the wildcard and switches to an explicit list
/// the first time a concrete value appears for that token; duplicates
/// produced by the join fan-out are kept out, so the lists hold distinct
/// values in order of first appearance. The two dimensions are decided
/// independently, so a token with only project links keeps wildcard
/// environment scope and vice versa.
pub fn aggregate_rows<I>(rows: I) -> Vec<ApiToken>
where
    I: IntoIterator<Item = ApiTokenRow>,
{
    let mut order: Vec<String> = Vec::new();
    let mut tokens: HashMap<String, ApiToken> = HashMap::new();

    for row in rows {
        let token = match tokens.entry(row.secret.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                order.push(row.secret.clone());
                entry.insert(ApiToken {
                    secret: row.secret.clone(),
                    username: row.username.clone(),
                    token_type: row.token_type,
                    projects: vec![ALL_PROJECTS.to_string()],
                    environments: vec![ALL_ENVIRONMENTS.to_string()],
                    project: ALL_PROJECTS.to_string(),
                    environment: ALL_ENVIRONMENTS.to_string(),
                    expires_at: row.expires_at,
                    created_at: row.created_at,
                    seen_at: row.seen_at,
                })
            }
        };

        if let Some(project) = row.project {
            if token.projects == [ALL_PROJECTS] {
                token.projects.clear();
            }
            if !token.projects.contains(&project) {
                token.projects.push(project);
            }
            token.project = token.projects.join(",");
        }

        if let Some(environment) = row.environment {
            if token.environments == [ALL_ENVIRONMENTS] {
                token.environments.clear();
            }
            if !token.environments.contains(&environment) {
                token.environments.push(environment);
            }
            token.environment = token.environments.join(",");
        }
    }

    order
        .into_iter()
        .filter_map(|secret| tokens.remove(&secret))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(secret: &str, project: Option<&str>, environment: Option<&str>) -> ApiTokenRow {
        ApiTokenRow {
            secret: secret.to_string(),
            username: "tester".to_string(),
            token_type: ApiTokenType::Client,
            expires_at: None,
            created_at: Utc::now(),
            seen_at: None,
            project: project.map(str::to_string),
            environment: environment.map(str::to_string),
        }
    }

    #[test]
    fn test_single_row_keeps_wildcard_scope() {
        let tokens = aggregate_rows(vec![row("s1", None, None)]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].projects, vec!["*".to_string()]);
        assert_eq!(tokens[0].environments, vec!["*".to_string()]);
        assert_eq!(tokens[0].project, "*");
        assert_eq!(tokens[0].environment, "*");
    }

    #[test]
    fn test_project_links_replace_wildcard() {
        let tokens = aggregate_rows(vec![
            row("s1", Some("p1"), None),
            row("s1", Some("p2"), None),
        ]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].projects, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(tokens[0].project, "p1,p2");
        // Environment dimension decided independently
        assert_eq!(tokens[0].environments, vec!["*".to_string()]);
    }

    #[test]
    fn test_environment_links_replace_wildcard() {
        let tokens = aggregate_rows(vec![row("s1", None, Some("development"))]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].projects, vec!["*".to_string()]);
        assert_eq!(tokens[0].environments, vec!["development".to_string()]);
        assert_eq!(tokens[0].environment, "development");
    }

    #[test]
    fn test_join_fanout_produces_distinct_members() {
        // Two projects x two environments produce four rows for one token
        let tokens = aggregate_rows(vec![
            row("s1", Some("p1"), Some("dev")),
            row("s1", Some("p1"), Some("prod")),
            row("s1", Some("p2"), Some("dev")),
            row("s1", Some("p2"), Some("prod")),
        ]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].projects, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(
            tokens[0].environments,
            vec!["dev".to_string(), "prod".to_string()]
        );
    }

    #[test]
    fn test_membership_is_order_independent() {
        let forward = aggregate_rows(vec![
            row("s1", Some("p1"), None),
            row("s1", Some("p2"), None),
        ]);
        let reversed = aggregate_rows(vec![
            row("s1", Some("p2"), None),
            row("s1", Some("p1"), None),
        ]);

        let mut forward_projects = forward[0].projects.clone();
        let mut reversed_projects = reversed[0].projects.clone();
        forward_projects.sort();
        reversed_projects.sort();

        assert_eq!(forward_projects, reversed_projects);
    }

    #[test]
    fn test_tokens_come_out_in_first_seen_order() {
        let tokens = aggregate_rows(vec![
            row("s2", Some("p1"), None),
            row("s1", None, None),
            row("s2", Some("p2"), None),
            row("s3", None, Some("dev")),
        ]);

        let secrets: Vec<&str> = tokens.iter().map(|t| t.secret.as_str()).collect();
        assert_eq!(secrets, vec!["s2", "s1", "s3"]);
    }

    #[test]
    fn test_one_token_per_distinct_secret() {
        let tokens = aggregate_rows(vec![
            row("s1", None, None),
            row("s2", None, None),
            row("s3", None, None),
        ]);

        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.projects == ["*".to_string()]));
        assert!(tokens.iter().all(|t| t.environments == ["*".to_string()]));
    }

    #[test]
    fn test_scalar_fields_come_from_first_row() {
        let mut first = row("s1", Some("p1"), None);
        first.username = "alice".to_string();
        let mut second = row("s1", Some("p2"), None);
        second.username = "alice".to_string();

        let tokens = aggregate_rows(vec![first.clone(), second]);

        assert_eq!(tokens[0].username, "alice");
        assert_eq!(tokens[0].created_at, first.created_at);
    }
}
