//! Quay tag listing

use serde::Deserialize;
use tracing::warn;

use crate::version::error::RegistryError;
use crate::version::registries::{check_status, http_client};
use crate::version::registry::TagRegistry;

/// Default base URL for the Quay API
const DEFAULT_BASE_URL: &str = "https://quay.io";

const HOST: &str = "Quay";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Registry implementation for the Quay repository tag API
pub struct QuayRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl QuayRegistry {
    /// Creates a new QuayRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for QuayRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl TagRegistry for QuayRegistry {
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!(
            "{}/api/v1/repository/{}/tag/?limit=100",
            self.base_url, repository
        );

        let response = check_status(self.client.get(&url).send().await?, HOST)?;

        let tags: TagsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Quay response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(tags.tags.into_iter().map(|t| t.name).collect())
    }
}
