//! Update checks for scanned images and charts
//!
//! References are processed one at a time, images first. The first
//! rate-limit response halts all further cache and upstream access for the
//! rest of the run; remaining references are still reported, as errors.

use std::fmt;
use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::parser::types::{ChartReference, ImageReference, ScanResults};
use crate::version::cache::{CachedLookup, Namespace};
use crate::version::error::{CacheError, RegistryError};
use crate::version::registry::Upstream;
use crate::version::resolver::select_latest;

/// Message for the reference whose lookup was rate limited
pub const RATE_LIMIT_EXCEEDED: &str = "rate limit exceeded";

/// Message for references left unchecked after a rate limit
pub const RATE_LIMIT_HIT: &str = "rate limit hit";

/// Trait for storing and retrieving lookup results
#[cfg_attr(test, automock)]
pub trait LookupStore: Send + Sync {
    /// Get a fresh entry; expired or missing entries are `None`
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<CachedLookup>, CacheError>;

    /// Store an entry, replacing any previous one for `key`
    fn set(
        &self,
        namespace: Namespace,
        key: &str,
        latest: &str,
        all_tags: Vec<String>,
    ) -> Result<(), CacheError>;
}

/// Update status of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    UpToDate,
    UpdateAvailable,
    Skipped,
    Unknown,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::UpToDate => "OK",
            Status::UpdateAvailable => "UPDATE",
            Status::Skipped => "SKIPPED",
            Status::Unknown => "UNKNOWN",
            Status::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Status from the pinned and latest version strings
pub fn determine_status(current: &str, latest: &str) -> Status {
    if current == latest {
        Status::UpToDate
    } else if latest.is_empty() {
        Status::Unknown
    } else {
        Status::UpdateAvailable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub registry: String,
    pub repository: String,
    pub current: String,
    pub latest: String,
    pub status: Status,
    pub error: Option<String>,
    pub path: PathBuf,
    pub line: usize,
}

impl ImageResult {
    fn new(image: &ImageReference, latest: String, status: Status, error: Option<String>) -> Self {
        Self {
            registry: image.registry.clone(),
            repository: image.repository.clone(),
            current: image.tag.clone(),
            latest,
            status,
            error,
            path: image.path.clone(),
            line: image.line,
        }
    }

    fn checked(image: &ImageReference, latest: String) -> Self {
        let status = determine_status(&image.tag, &latest);
        Self::new(image, latest, status, None)
    }

    fn skipped(image: &ImageReference) -> Self {
        Self::new(image, String::new(), Status::Skipped, None)
    }

    fn failed(image: &ImageReference, message: impl Into<String>) -> Self {
        Self::new(image, String::new(), Status::Error, Some(message.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartResult {
    pub name: String,
    pub current: String,
    pub latest: String,
    pub upstream: String,
    pub app_version: String,
    pub status: Status,
    pub error: Option<String>,
    pub path: PathBuf,
    pub line: usize,
}

impl ChartResult {
    fn new(chart: &ChartReference, latest: String, status: Status, error: Option<String>) -> Self {
        Self {
            name: chart.name.clone(),
            current: chart.version.clone(),
            latest,
            upstream: chart.upstream.clone(),
            app_version: chart.app_version.clone(),
            status,
            error,
            path: chart.path.clone(),
            line: chart.line,
        }
    }

    fn checked(chart: &ChartReference, latest: String) -> Self {
        let status = determine_status(&chart.version, &latest);
        Self::new(chart, latest, status, None)
    }

    fn skipped(chart: &ChartReference) -> Self {
        Self::new(chart, String::new(), Status::Skipped, None)
    }

    fn failed(chart: &ChartReference, message: impl Into<String>) -> Self {
        Self::new(chart, String::new(), Status::Error, Some(message.into()))
    }
}

/// One result per scanned reference, in scan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    pub images: Vec<ImageResult>,
    pub charts: Vec<ChartResult>,
}

/// Results of a run plus the rate-limit error if the run was halted
#[derive(Debug)]
pub struct CheckOutcome {
    pub results: Results,
    pub error: Option<RegistryError>,
}

impl CheckOutcome {
    pub fn rate_limited(&self) -> bool {
        self.error.as_ref().is_some_and(RegistryError::is_rate_limited)
    }
}

pub struct Checker<'a, S: LookupStore, U: Upstream> {
    store: &'a S,
    upstream: &'a U,
}

impl<'a, S: LookupStore, U: Upstream> Checker<'a, S, U> {
    pub fn new(store: &'a S, upstream: &'a U) -> Self {
        Self { store, upstream }
    }

    /// Checks every image and then every chart
    pub async fn check_all(&self, scan: &ScanResults) -> CheckOutcome {
        let mut results = Results {
            images: Vec::with_capacity(scan.images.len()),
            charts: Vec::with_capacity(scan.charts.len()),
        };
        let mut halt: Option<RegistryError> = None;

        for image in &scan.images {
            let result = if halt.is_some() {
                ImageResult::failed(image, RATE_LIMIT_HIT)
            } else if image.skipped {
                ImageResult::skipped(image)
            } else {
                match self.latest_image_tag(image).await {
                    Ok(latest) => ImageResult::checked(image, latest),
                    Err(e) if e.is_rate_limited() => {
                        warn!("Rate limited while checking {}, halting lookups", image.raw);
                        halt = Some(e);
                        ImageResult::failed(image, RATE_LIMIT_EXCEEDED)
                    }
                    Err(e) => ImageResult::failed(image, e.to_string()),
                }
            };
            results.images.push(result);
        }

        for chart in &scan.charts {
            let result = if halt.is_some() {
                ChartResult::failed(chart, RATE_LIMIT_HIT)
            } else if chart.upstream.is_empty() {
                ChartResult::skipped(chart)
            } else {
                match self.latest_chart_version(chart).await {
                    Ok(latest) => ChartResult::checked(chart, latest),
                    Err(e) if e.is_rate_limited() => {
                        warn!("Rate limited while checking chart {}, halting lookups", chart.name);
                        halt = Some(e);
                        ChartResult::failed(chart, RATE_LIMIT_EXCEEDED)
                    }
                    Err(e) => ChartResult::failed(chart, e.to_string()),
                }
            };
            results.charts.push(result);
        }

        CheckOutcome {
            results,
            error: halt,
        }
    }

    async fn latest_image_tag(&self, image: &ImageReference) -> Result<String, RegistryError> {
        let key = format!("{}/{}", image.registry, image.repository);

        if let Some(cached) = self.cached(Namespace::Images, &key) {
            debug!("Cache hit for image {}", key);
            if cached.all_tags.is_empty() {
                return Ok(cached.latest);
            }
            return Ok(select_latest(&cached.all_tags, &image.tag));
        }

        let info = self
            .upstream
            .latest_tag(&image.registry, &image.repository, &image.tag)
            .await?;
        self.store_entry(Namespace::Images, &key, &info.latest, info.all_tags);
        Ok(info.latest)
    }

    async fn latest_chart_version(&self, chart: &ChartReference) -> Result<String, RegistryError> {
        let key = format!("{}/{}", chart.upstream, chart.name);

        if let Some(cached) = self.cached(Namespace::Charts, &key) {
            debug!("Cache hit for chart {}", key);
            return Ok(cached.latest);
        }

        let info = self
            .upstream
            .latest_chart_version(&chart.name, &chart.upstream)
            .await?;
        self.store_entry(Namespace::Charts, &key, &info.latest_version, vec![]);
        Ok(info.latest_version)
    }

    fn cached(&self, namespace: Namespace, key: &str) -> Option<CachedLookup> {
        self.store.get(namespace, key).unwrap_or_else(|e| {
            warn!("Cache read failed for {}/{}: {}", namespace.as_str(), key, e);
            None
        })
    }

    fn store_entry(&self, namespace: Namespace, key: &str, latest: &str, all_tags: Vec<String>) {
        if let Err(e) = self.store.set(namespace, key, latest, all_tags) {
            warn!("Cache write failed for {}/{}: {}", namespace.as_str(), key, e);
        }
    }
}
