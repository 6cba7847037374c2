//! ArtifactHub Helm chart lookup

use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registries::{check_status, http_client};
use crate::version::types::ChartVersionInfo;

/// Default base URL for the ArtifactHub API
const DEFAULT_BASE_URL: &str = "https://artifacthub.io";

const HOST: &str = "ArtifactHub";

#[derive(Debug, Deserialize)]
struct PackageResponse {
    #[serde(default)]
    version: String,
    #[serde(default)]
    app_version: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    packages: Vec<SearchPackage>,
}

#[derive(Debug, Deserialize)]
struct SearchPackage {
    name: String,
    #[serde(default)]
    version: String,
    repository: SearchRepository,
}

#[derive(Debug, Deserialize)]
struct SearchRepository {
    #[serde(default)]
    name: String,
}

/// Client for the ArtifactHub package API
pub struct ArtifactHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArtifactHubClient {
    /// Creates a new ArtifactHubClient with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Looks up the latest version of `chart` in the ArtifactHub repository `repo`
    ///
    /// Any non-200 answer to the direct lookup (other than 429) falls back to
    /// a full-text search.
    pub async fn latest_version(
        &self,
        repo: &str,
        chart: &str,
    ) -> Result<ChartVersionInfo, RegistryError> {
        let url = format!("{}/api/v1/packages/helm/{}/{}", self.base_url, repo, chart);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        match check_status(response, HOST) {
            Ok(response) => {
                let package: PackageResponse = response.json().await.map_err(|e| {
                    warn!("Failed to parse ArtifactHub package {}/{}: {}", repo, chart, e);
                    RegistryError::InvalidResponse(e.to_string())
                })?;
                Ok(ChartVersionInfo {
                    latest_version: package.version,
                    app_version: package.app_version,
                })
            }
            Err(e) if e.is_rate_limited() => Err(e),
            Err(e) => {
                debug!("Direct lookup of {}/{} failed ({}), searching", repo, chart, e);
                self.search(repo, chart).await
            }
        }
    }

    async fn search(&self, repo: &str, chart: &str) -> Result<ChartVersionInfo, RegistryError> {
        let url = format!(
            "{}/api/v1/packages/search?ts_query_web={}&kind=0&limit=10",
            self.base_url, chart
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response, HOST)?;

        let results: SearchResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse ArtifactHub search response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        let named = || results.packages.iter().filter(|p| p.name == chart);
        named()
            .find(|p| p.repository.name == repo)
            .or_else(|| named().next())
            .map(|p| ChartVersionInfo {
                latest_version: p.version.clone(),
                app_version: String::new(),
            })
            .ok_or_else(|| RegistryError::NotFound(format!("chart {}", chart)))
    }
}

impl Default for ArtifactHubClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
