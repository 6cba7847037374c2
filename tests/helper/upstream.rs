//! In-memory upstream that counts lookups

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use chartup::version::error::RegistryError;
use chartup::version::registry::Upstream;
use chartup::version::resolver::select_latest;
use chartup::version::types::{ChartVersionInfo, TagInfo};

/// Upstream backed by fixed tag lists and chart versions
#[derive(Default)]
pub struct FakeUpstream {
    tags: HashMap<String, Vec<String>>,
    charts: HashMap<String, String>,
    rate_limited: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, registry: &str, repository: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            format!("{}/{}", registry, repository),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_chart(mut self, upstream: &str, name: &str, version: &str) -> Self {
        self.charts
            .insert(format!("{}/{}", upstream, name), version.to_string());
        self
    }

    /// Answers lookups of `key` ("registry/repository" or "upstream/name") with a rate limit
    pub fn rate_limit(mut self, key: &str) -> Self {
        self.rate_limited.insert(key.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, key: &str) -> Result<(), RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited.contains(key) {
            return Err(RegistryError::RateLimited {
                retry_after_secs: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn latest_tag(
        &self,
        registry: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<TagInfo, RegistryError> {
        let key = format!("{}/{}", registry, repository);
        self.record(&key)?;

        let all_tags = self
            .tags
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;
        Ok(TagInfo {
            latest: select_latest(&all_tags, current_tag),
            all_tags,
        })
    }

    async fn latest_chart_version(
        &self,
        chart: &str,
        upstream: &str,
    ) -> Result<ChartVersionInfo, RegistryError> {
        let key = format!("{}/{}", upstream, chart);
        self.record(&key)?;

        let latest_version = self
            .charts
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("chart {}", chart)))?;
        Ok(ChartVersionInfo {
            latest_version,
            app_version: String::new(),
        })
    }
}
