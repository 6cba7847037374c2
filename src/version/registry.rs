//! Registry traits for fetching image tags and chart versions

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::{ChartVersionInfo, TagInfo};

/// Trait for listing the tags of an image repository on one registry
#[async_trait::async_trait]
pub trait TagRegistry: Send + Sync {
    /// Fetches the tags of a repository in the order the registry returns them
    ///
    /// # Arguments
    /// * `repository` - Repository path without the registry host (e.g., "minio/minio")
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;
}

/// Uniform lookup capability over every supported registry and chart catalog
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches the tags of an image and selects the latest one relative to `current_tag`
    ///
    /// # Arguments
    /// * `registry` - Registry host (e.g., "docker.io", "ghcr.io")
    /// * `repository` - Repository path (e.g., "bitnami/postgresql")
    /// * `current_tag` - The pinned tag, used to match tag style
    async fn latest_tag(
        &self,
        registry: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<TagInfo, RegistryError>;

    /// Fetches the latest version of a chart published by `upstream`
    async fn latest_chart_version(
        &self,
        chart: &str,
        upstream: &str,
    ) -> Result<ChartVersionInfo, RegistryError>;
}
