//! Common types for parsers

use std::path::PathBuf;

/// Registry host assumed for references without an explicit one
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Tag assumed when a reference does not pin one
pub const DEFAULT_TAG: &str = "latest";

/// A container image reference found in a scanned file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry host (e.g., "docker.io", "quay.io")
    pub registry: String,
    /// Repository path without the registry (e.g., "trinodb/trino")
    pub repository: String,
    /// Pinned tag (e.g., "410")
    pub tag: String,
    /// The reference exactly as written, used for deduplication
    pub raw: String,
    /// File the reference was found in
    pub path: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Repository matched an excluded organization; never looked up
    pub skipped: bool,
}

/// A Helm chart declaration: either a chart's own Chart.yaml or one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartReference {
    pub name: String,
    pub version: String,
    pub app_version: String,
    pub path: PathBuf,
    /// Line of the version declaration (1-indexed), 0 when unknown
    pub line: usize,
    /// Known upstream catalog id (e.g., "bitnami"); empty for local charts
    pub upstream: String,
}

impl ChartReference {
    /// Deduplication key within one scan
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Everything the scanner found, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResults {
    pub images: Vec<ImageReference>,
    pub charts: Vec<ChartReference>,
}

impl ScanResults {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.charts.is_empty()
    }
}

/// References extracted from a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub images: Vec<ImageReference>,
    pub charts: Vec<ChartReference>,
}

impl ParsedFile {
    pub fn images(images: Vec<ImageReference>) -> Self {
        Self {
            images,
            charts: Vec::new(),
        }
    }

    pub fn charts(charts: Vec<ChartReference>) -> Self {
        Self {
            images: Vec::new(),
            charts,
        }
    }
}
