//! Release resolution through the hosting API query endpoint.
//!
//! A single query fetches the most recent releases of a repository, newest
//! first by creation time. Releases are split into stable and prerelease
//! sequences in API order, and each tag loses one leading `v`.
//!
//! Failures fall in two classes:
//! - transport failures (connection, error status, timeout) are logged and
//!   yield an empty result, leaving the caller to decide what "nothing
//!   resolved" means;
//! - an `errors` list in the payload is fatal and surfaces as
//!   [`JojoError::ReleaseQuery`] after every message has been logged.

use jojo_common::constants::{GITHUB_TOKEN_ENV, RELEASE_API_ENDPOINT, RELEASE_API_MAX_PAGE};
use jojo_common::error::{JojoError, Result};
use jojo_common::types::{ReleaseSource, ResolvedVersions, SourceKind};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer};

use crate::registry::VersionResolver;

const RELEASES_QUERY: &str = r"
query($owner: String!, $repo: String!, $first: Int!) {
  repository(name: $repo, owner: $owner) {
    releases(first: $first, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        tagName
        isPrerelease
      }
    }
  }
}
";

/// Strips a single leading `v` from a release tag.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.strip_prefix('v').unwrap_or(tag).to_string()
}

/// Payload returned by the query endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseResponse {
    /// Query result, absent when the query was rejected.
    #[serde(default)]
    pub data: Option<ReleaseData>,
    /// Errors reported by the API. `Some` whenever the member is present,
    /// even as `null`.
    #[serde(default, deserialize_with = "present_errors")]
    pub errors: Option<Vec<ApiError>>,
}

fn present_errors<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<ApiError>>, D::Error>
where
    D: Deserializer<'de>,
{
    let errors = Option::<Vec<ApiError>>::deserialize(deserializer)?;
    Ok(Some(errors.unwrap_or_default()))
}

/// `data` member of the payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseData {
    /// The repository, `null` when it does not exist.
    #[serde(default)]
    pub repository: Option<Repository>,
}

/// Repository object of the payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    /// Release connection.
    pub releases: ReleaseConnection,
}

/// Page of release nodes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseConnection {
    /// Releases, newest first.
    #[serde(default)]
    pub nodes: Vec<ReleaseNode>,
}

/// A single release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNode {
    /// Git tag of the release.
    pub tag_name: String,
    /// Whether the release is marked as a prerelease.
    #[serde(default)]
    pub is_prerelease: bool,
}

/// An entry of the payload `errors` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Human readable description.
    #[serde(default)]
    pub message: String,
}

impl ReleaseResponse {
    /// Turns the payload into stable and prerelease versions.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::ReleaseQuery`] if the payload carries an `errors` list.
    pub fn into_versions(self) -> Result<ResolvedVersions> {
        if let Some(errors) = self.errors {
            if errors.is_empty() {
                tracing::error!("release query returned an errors member");
            }
            for error in &errors {
                tracing::error!(message = %error.message, "release query error");
            }
            return Err(JojoError::ReleaseQuery {
                errors: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        let Some(repository) = self.data.and_then(|d| d.repository) else {
            tracing::info!("repository not found, no releases");
            return Ok(ResolvedVersions::empty());
        };

        let (unstable, stable): (Vec<_>, Vec<_>) = repository
            .releases
            .nodes
            .into_iter()
            .partition(|node| node.is_prerelease);
        Ok(ResolvedVersions {
            stable: stable.iter().map(|n| normalize_tag(&n.tag_name)).collect(),
            unstable: unstable.iter().map(|n| normalize_tag(&n.tag_name)).collect(),
            matched: None,
        })
    }
}

/// Resolves versions from the releases of a hosted repository.
#[derive(Debug)]
pub struct ReleaseResolver {
    source: ReleaseSource,
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl ReleaseResolver {
    /// Creates a resolver for `source`, reading the bearer token from
    /// [`GITHUB_TOKEN_ENV`] when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(source: ReleaseSource) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jojo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JojoError::Http {
                url: RELEASE_API_ENDPOINT.to_string(),
                message: e.to_string(),
            })?;
        let token = std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::debug!("{GITHUB_TOKEN_ENV} not set, querying unauthenticated");
        }
        Ok(Self {
            source,
            endpoint: RELEASE_API_ENDPOINT.to_string(),
            token,
            client,
        })
    }

    /// Points the resolver at another query endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replaces the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The source this resolver reads.
    #[must_use]
    pub const fn source(&self) -> &ReleaseSource {
        &self.source
    }

    /// Runs the release query, returning `None` on transport failure.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::Json`] if a successful response is not a valid payload.
    pub fn query(&self, limit: u32) -> Result<Option<ReleaseResponse>> {
        let body = serde_json::json!({
            "query": RELEASES_QUERY,
            "variables": {
                "owner": self.source.owner(),
                "repo": self.source.repository(),
                "first": limit,
            },
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let text = match request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(endpoint = %self.endpoint, error = %e, "connection failed");
                return Ok(None);
            }
        };
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl VersionResolver for ReleaseResolver {
    fn kind(&self) -> SourceKind {
        SourceKind::Release
    }

    fn get_all(&self, limit: u32) -> Result<ResolvedVersions> {
        let first = limit.min(RELEASE_API_MAX_PAGE);
        if first == 0 {
            return Ok(ResolvedVersions::empty());
        }
        tracing::info!(
            owner = self.source.owner(),
            repo = self.source.repository(),
            first,
            "querying releases"
        );
        match self.query(first)? {
            Some(response) => response.into_versions(),
            None => Ok(ResolvedVersions::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ReleaseResponse {
        serde_json::from_str(json).expect("valid payload")
    }

    #[test]
    fn normalize_strips_single_leading_v() {
        assert_eq!(normalize_tag("v2.0.0"), "2.0.0");
        assert_eq!(normalize_tag("2.0.0"), "2.0.0");
        assert_eq!(normalize_tag("v"), "");
        assert_eq!(normalize_tag("vv1"), "v1");
    }

    #[test]
    fn normalize_is_idempotent_on_normalized_tags() {
        for tag in ["v1.2.3", "1.2.3", "release-1", "v"] {
            let once = normalize_tag(tag);
            assert_eq!(normalize_tag(&once), once);
        }
    }

    #[test]
    fn releases_are_partitioned_in_api_order() {
        let payload = response(
            r#"{"data":{"repository":{"releases":{"nodes":[
                {"tagName":"v2.1.0-rc1","isPrerelease":true},
                {"tagName":"v2.0.1","isPrerelease":false},
                {"tagName":"2.0.0","isPrerelease":false},
                {"tagName":"v2.0.0-beta","isPrerelease":true},
                {"tagName":"v1.9.9","isPrerelease":false}
            ]}}}}"#,
        );
        let versions = payload.into_versions().expect("versions");
        assert_eq!(versions.stable, vec!["2.0.1", "2.0.0", "1.9.9"]);
        assert_eq!(versions.unstable, vec!["2.1.0-rc1", "2.0.0-beta"]);
        assert_eq!(versions.latest(), Some("2.0.1"));
        assert!(versions.matched.is_none());
    }

    #[test]
    fn missing_repository_yields_no_versions() {
        let payload = response(r#"{"data":{"repository":null}}"#);
        assert!(payload.into_versions().expect("versions").is_empty());
    }

    #[test]
    fn payload_errors_are_fatal() {
        let payload = response(
            r#"{"data":null,"errors":[
                {"message":"Field 'releasez' doesn't exist"},
                {"message":"Variable $first is required"}
            ]}"#,
        );
        let Err(JojoError::ReleaseQuery { errors }) = payload.into_versions() else {
            unreachable!("payload errors must be fatal");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1], "Variable $first is required");
    }

    #[test]
    fn null_errors_member_is_fatal() {
        let payload = response(r#"{"data":{"repository":null},"errors":null}"#);
        assert!(matches!(
            payload.into_versions(),
            Err(JojoError::ReleaseQuery { errors }) if errors.is_empty()
        ));
    }

    #[test]
    fn absent_errors_member_is_success() {
        let payload = response(r#"{"data":{"repository":null}}"#);
        assert!(payload.errors.is_none());
    }

    #[test]
    fn transport_failure_yields_empty_result() {
        let resolver = ReleaseResolver::new(ReleaseSource::new("owner", "repo"))
            .expect("resolver")
            .with_endpoint("http://127.0.0.1:1/graphql")
            .with_token(None);
        let versions = resolver.get_all(10).expect("transport failure is not an error");
        assert!(versions.is_empty());
        assert!(resolver.get_latest(10).expect("latest").is_none());
    }

    #[test]
    fn zero_limit_skips_the_query() {
        let resolver = ReleaseResolver::new(ReleaseSource::new("owner", "repo"))
            .expect("resolver")
            .with_endpoint("http://127.0.0.1:1/graphql");
        assert!(resolver.get_all(0).expect("versions").is_empty());
    }
}
