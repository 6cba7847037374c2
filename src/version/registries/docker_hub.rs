//! Docker Hub tag listing

use serde::Deserialize;
use tracing::warn;

use crate::version::error::RegistryError;
use crate::version::registries::{check_status, http_client};
use crate::version::registry::TagRegistry;

/// Default base URL for the Docker Hub API
const DEFAULT_BASE_URL: &str = "https://hub.docker.com";

const HOST: &str = "Docker Hub";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Registry implementation for the Docker Hub tags API
pub struct DockerHubRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl DockerHubRegistry {
    /// Creates a new DockerHubRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Official images live under `library/` (e.g., "postgres" -> "library/postgres")
    fn qualify_repository(repository: &str) -> String {
        if repository.contains('/') {
            repository.to_string()
        } else {
            format!("library/{}", repository)
        }
    }
}

impl Default for DockerHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl TagRegistry for DockerHubRegistry {
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!(
            "{}/v2/repositories/{}/tags?page_size=100",
            self.base_url,
            Self::qualify_repository(repository)
        );

        let response = check_status(self.client.get(&url).send().await?, HOST)?;

        let tags: TagsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Docker Hub response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(tags.results.into_iter().map(|t| t.name).collect())
    }
}
