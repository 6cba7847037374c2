use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache time-to-live in seconds (1 hour)
pub const DEFAULT_CACHE_TTL_SECS: i64 = 60 * 60;

/// Timeout for a single upstream request in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Default cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = ".chartup-cache.json";

/// Config file looked up in the scan root when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = ".chartup.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration consumed by the scanner and the checker
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub cache: CacheConfig,
    /// Repository substrings whose images are reported as skipped
    pub excluded_orgs: Vec<String>,
    pub upstreams: UpstreamsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            excluded_orgs: vec!["thinkportgmbh".to_string()],
            upstreams: UpstreamsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] inside
    /// `scan_root` when no path is given. A missing default file yields
    /// [`Config::default`]; a missing explicit file is an error.
    pub fn load(path: Option<&Path>, scan_root: &Path) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (scan_root.join(DEFAULT_CONFIG_FILE), false),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Time-to-live of cached lookups in seconds
    pub ttl_secs: i64,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            path: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

/// Data tables mapping charts to the catalog they are published in
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpstreamsConfig {
    /// Rules for a chart's own Chart.yaml, evaluated in order
    pub chart_rules: Vec<ChartRule>,
    /// Rules for entries under `dependencies:`, evaluated in order
    pub dependency_rules: Vec<DependencyRule>,
    /// Upstream id -> ArtifactHub repository name
    pub artifact_hub_repos: HashMap<String, String>,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            chart_rules: vec![
                ChartRule::named("trino", None, "trinodb"),
                ChartRule::named("postgresql", Some("bitnami"), "bitnami"),
                ChartRule::named("common", Some("bitnami"), "bitnami"),
                ChartRule::path("/charts/postgresql", "bitnami"),
                ChartRule::path("/charts/common", "bitnami"),
            ],
            dependency_rules: vec![DependencyRule {
                repository_contains: "bitnami".to_string(),
                upstream: "bitnami".to_string(),
            }],
            artifact_hub_repos: HashMap::from([
                ("bitnami".to_string(), "bitnami".to_string()),
                ("trinodb".to_string(), "trino".to_string()),
            ]),
        }
    }
}

impl UpstreamsConfig {
    /// ArtifactHub repository name for an upstream id (identity when unmapped)
    pub fn artifact_hub_repo<'a>(&'a self, upstream: &'a str) -> &'a str {
        self.artifact_hub_repos
            .get(upstream)
            .map(String::as_str)
            .unwrap_or(upstream)
    }
}

/// Matches a chart by exact name and/or a substring of its file path.
/// Both comparisons are case-insensitive; an absent field always matches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path_contains: Option<String>,
    pub upstream: String,
}

impl ChartRule {
    fn named(name: &str, path_contains: Option<&str>, upstream: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            path_contains: path_contains.map(str::to_string),
            upstream: upstream.to_string(),
        }
    }

    fn path(path_contains: &str, upstream: &str) -> Self {
        Self {
            name: None,
            path_contains: Some(path_contains.to_string()),
            upstream: upstream.to_string(),
        }
    }
}

/// Matches a dependency by a substring of its declared repository URL
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRule {
    pub repository_contains: String,
    pub upstream: String,
}

/// Returns the path to the data directory for chartup.
/// Uses $XDG_DATA_HOME/chartup if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/chartup,
/// or ./chartup if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("chartup")
}
