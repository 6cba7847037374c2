//! Registry implementations for fetching image tags and chart versions

pub mod artifact_hub;
pub mod docker_hub;
pub mod oci;
pub mod quay;

use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_SECS, UpstreamsConfig};
use crate::parser::types::DEFAULT_REGISTRY;
use crate::version::error::RegistryError;
use crate::version::registry::{TagRegistry, Upstream};
use crate::version::resolver::select_latest;
use crate::version::types::{ChartVersionInfo, TagInfo};

pub use artifact_hub::ArtifactHubClient;
pub use docker_hub::DockerHubRegistry;
pub use oci::OciRegistry;
pub use quay::QuayRegistry;

/// HTTP client shared by every registry adapter
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("chartup")
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// Maps 429 to the rate-limit sentinel and any other non-2xx status to a lookup failure
pub(crate) fn check_status(response: Response, host: &str) -> Result<Response, RegistryError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        warn!("{} rate limited the request", host);
        return Err(RegistryError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        warn!("{} returned status {}: {}", host, status, response.url());
        return Err(RegistryError::UnexpectedStatus {
            host: host.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Registry family an image host belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryKind {
    DockerHub,
    Quay,
    /// Registry speaking the OCI distribution API, optionally behind an anonymous token endpoint
    Oci {
        host: String,
        token_path: Option<&'static str>,
    },
}

/// Host patterns per registry family. Longest matching pattern wins.
const HOST_PATTERNS: &[(&str, Family)] = &[
    ("docker.io", Family::DockerHub),
    ("quay.io", Family::Quay),
    ("ghcr.io", Family::Oci(Some("/token"))),
    ("gcr.io", Family::Oci(Some("/v2/token"))),
    ("registry.k8s.io", Family::Oci(None)),
];

#[derive(Debug, Clone, Copy)]
enum Family {
    DockerHub,
    Quay,
    Oci(Option<&'static str>),
}

impl RegistryKind {
    /// Classifies a registry host; `None` for hosts with no adapter
    pub fn classify(host: &str) -> Option<Self> {
        let host = host.trim().to_lowercase();
        if host.is_empty() || host == DEFAULT_REGISTRY {
            return Some(RegistryKind::DockerHub);
        }

        let family = HOST_PATTERNS
            .iter()
            .filter(|(pattern, _)| host == *pattern || host.ends_with(&format!(".{}", pattern)))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, family)| *family)?;

        Some(match family {
            Family::DockerHub => RegistryKind::DockerHub,
            Family::Quay => RegistryKind::Quay,
            Family::Oci(token_path) => RegistryKind::Oci { host, token_path },
        })
    }
}

/// Base URLs for every upstream; overridable for tests
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub docker_hub: Option<String>,
    pub quay: Option<String>,
    pub artifact_hub: Option<String>,
    /// Replaces `https://<host>` for every OCI registry
    pub oci: Option<String>,
}

/// Dispatches image lookups by registry host and chart lookups to ArtifactHub
pub struct UpstreamClient {
    docker_hub: DockerHubRegistry,
    quay: QuayRegistry,
    artifact_hub: ArtifactHubClient,
    oci_base_url: Option<String>,
    upstreams: UpstreamsConfig,
}

impl UpstreamClient {
    pub fn new(upstreams: UpstreamsConfig) -> Self {
        Self::with_endpoints(upstreams, Endpoints::default())
    }

    pub fn with_endpoints(upstreams: UpstreamsConfig, endpoints: Endpoints) -> Self {
        Self {
            docker_hub: endpoints
                .docker_hub
                .as_deref()
                .map(DockerHubRegistry::new)
                .unwrap_or_default(),
            quay: endpoints
                .quay
                .as_deref()
                .map(QuayRegistry::new)
                .unwrap_or_default(),
            artifact_hub: endpoints
                .artifact_hub
                .as_deref()
                .map(ArtifactHubClient::new)
                .unwrap_or_default(),
            oci_base_url: endpoints.oci,
            upstreams,
        }
    }

    async fn fetch_tags(&self, registry: &str, repository: &str) -> Result<Vec<String>, RegistryError> {
        match RegistryKind::classify(registry) {
            Some(RegistryKind::DockerHub) => self.docker_hub.fetch_tags(repository).await,
            Some(RegistryKind::Quay) => self.quay.fetch_tags(repository).await,
            Some(RegistryKind::Oci { host, token_path }) => {
                let base_url = self
                    .oci_base_url
                    .clone()
                    .unwrap_or_else(|| format!("https://{}", host));
                OciRegistry::new(&host, &base_url, token_path)
                    .fetch_tags(repository)
                    .await
            }
            None => Err(RegistryError::UnsupportedRegistry(registry.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl Upstream for UpstreamClient {
    async fn latest_tag(
        &self,
        registry: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<TagInfo, RegistryError> {
        debug!("Fetching tags for {}/{}", registry, repository);
        let all_tags = self.fetch_tags(registry, repository).await?;
        let latest = select_latest(&all_tags, current_tag);
        Ok(TagInfo { latest, all_tags })
    }

    async fn latest_chart_version(
        &self,
        chart: &str,
        upstream: &str,
    ) -> Result<ChartVersionInfo, RegistryError> {
        let repo = self.upstreams.artifact_hub_repo(upstream);
        debug!("Fetching chart {} from ArtifactHub repository {}", chart, repo);
        self.artifact_hub.latest_version(repo, chart).await
    }
}
