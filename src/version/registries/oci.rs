//! OCI distribution API tag listing (ghcr.io, gcr.io, registry.k8s.io)
//!
//! Some registries hand out anonymous pull tokens from a separate endpoint.
//! Token retrieval is best effort: any failure other than a rate limit falls
//! back to an unauthenticated tag-list request.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registries::{check_status, http_client};
use crate::version::registry::TagRegistry;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}

/// Registry implementation for OCI `/v2/<repo>/tags/list`
pub struct OciRegistry {
    client: reqwest::Client,
    host: String,
    base_url: String,
    token_path: Option<&'static str>,
}

impl OciRegistry {
    /// Creates a new OciRegistry
    ///
    /// # Arguments
    /// * `host` - Registry host used in error messages (e.g., "ghcr.io")
    /// * `base_url` - Base URL requests are sent to (e.g., "https://ghcr.io")
    /// * `token_path` - Anonymous token endpoint path, if the registry has one
    pub fn new(host: &str, base_url: &str, token_path: Option<&'static str>) -> Self {
        Self {
            client: http_client(),
            host: host.to_string(),
            base_url: base_url.to_string(),
            token_path,
        }
    }

    async fn anonymous_token(&self, repository: &str) -> Result<Option<String>, RegistryError> {
        let Some(token_path) = self.token_path else {
            return Ok(None);
        };

        let url = format!(
            "{}{}?scope=repository:{}:pull",
            self.base_url, token_path, repository
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Token request to {} failed, continuing without token: {}", self.host, e);
                return Ok(None);
            }
        };

        match check_status(response, &self.host) {
            Ok(response) => match response.json::<TokenResponse>().await {
                Ok(body) if !body.token.is_empty() => Ok(Some(body.token)),
                Ok(_) => Ok(None),
                Err(e) => {
                    debug!("Ignoring undecodable token response from {}: {}", self.host, e);
                    Ok(None)
                }
            },
            Err(e) if e.is_rate_limited() => Err(e),
            Err(e) => {
                debug!("Continuing without token: {}", e);
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl TagRegistry for OciRegistry {
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let token = self.anonymous_token(repository).await?;

        let url = format!("{}/v2/{}/tags/list", self.base_url, repository);
        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RegistryError::Unauthorized(self.host.clone()));
        }
        let response = check_status(response, &self.host)?;

        let tags: TagsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse {} tag list: {}", self.host, e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(tags.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const TAG_LIST: &str = r#"{"name": "org/app", "tags": ["v1.0.0", "v1.1.0"]}"#;

    #[tokio::test]
    async fn fetch_tags_sends_anonymous_token() {
        let mut server = Server::new_async().await;

        let token_mock = server
            .mock("GET", "/token?scope=repository:org/app:pull")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token": "anon-token"}"#)
            .create_async()
            .await;
        let tags_mock = server
            .mock("GET", "/v2/org/app/tags/list")
            .match_header("authorization", "Bearer anon-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TAG_LIST)
            .create_async()
            .await;

        let registry = OciRegistry::new("ghcr.io", &server.url(), Some("/token"));
        let result = registry.fetch_tags("org/app").await.unwrap();

        token_mock.assert_async().await;
        tags_mock.assert_async().await;
        assert_eq!(result, vec!["v1.0.0", "v1.1.0"]);
    }

    #[tokio::test]
    async fn fetch_tags_continues_without_token_when_token_endpoint_fails() {
        let mut server = Server::new_async().await;

        let token_mock = server
            .mock("GET", "/v2/token?scope=repository:proj/app:pull")
            .with_status(500)
            .create_async()
            .await;
        let tags_mock = server
            .mock("GET", "/v2/proj/app/tags/list")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TAG_LIST)
            .create_async()
            .await;

        let registry = OciRegistry::new("gcr.io", &server.url(), Some("/v2/token"));
        let result = registry.fetch_tags("proj/app").await.unwrap();

        token_mock.assert_async().await;
        tags_mock.assert_async().await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn fetch_tags_stops_when_token_endpoint_rate_limits() {
        let mut server = Server::new_async().await;

        let _token_mock = server
            .mock("GET", "/token?scope=repository:org/app:pull")
            .with_status(429)
            .create_async()
            .await;
        let tags_mock = server
            .mock("GET", "/v2/org/app/tags/list")
            .expect(0)
            .create_async()
            .await;

        let registry = OciRegistry::new("ghcr.io", &server.url(), Some("/token"));
        let result = registry.fetch_tags("org/app").await;

        tags_mock.assert_async().await;
        assert!(result.unwrap_err().is_rate_limited());
    }

    #[tokio::test]
    async fn fetch_tags_without_token_endpoint_lists_directly() {
        let mut server = Server::new_async().await;

        let tags_mock = server
            .mock("GET", "/v2/ingress-nginx/controller/tags/list")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tags": ["v1.10.0"]}"#)
            .create_async()
            .await;

        let registry = OciRegistry::new("registry.k8s.io", &server.url(), None);
        let result = registry.fetch_tags("ingress-nginx/controller").await.unwrap();

        tags_mock.assert_async().await;
        assert_eq!(result, vec!["v1.10.0"]);
    }

    #[tokio::test]
    async fn fetch_tags_maps_401_to_unauthorized() {
        let mut server = Server::new_async().await;

        let _tags_mock = server
            .mock("GET", "/v2/private/app/tags/list")
            .with_status(401)
            .create_async()
            .await;

        let registry = OciRegistry::new("registry.k8s.io", &server.url(), None);
        let err = registry.fetch_tags("private/app").await.unwrap_err();

        assert_eq!(err.to_string(), "registry.k8s.io requires authentication");
    }

    #[tokio::test]
    async fn fetch_tags_maps_429_on_tag_list_to_rate_limited() {
        let mut server = Server::new_async().await;

        let _tags_mock = server
            .mock("GET", "/v2/busy/app/tags/list")
            .with_status(429)
            .create_async()
            .await;

        let registry = OciRegistry::new("registry.k8s.io", &server.url(), None);
        let result = registry.fetch_tags("busy/app").await;

        assert!(result.unwrap_err().is_rate_limited());
    }
}
