//! Directory walker that runs every parser over a tree and deduplicates references

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::parser::chart_yaml::ChartYamlParser;
use crate::parser::dockerfile::DockerfileParser;
use crate::parser::image::ImageParser;
use crate::parser::traits::Parser;
use crate::parser::types::ScanResults;
use crate::parser::upstream::UpstreamDetector;
use crate::parser::values_yaml::ValuesYamlParser;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Walks a directory tree and collects image and chart references
pub struct Scanner {
    parsers: Vec<Box<dyn Parser>>,
}

impl Scanner {
    /// Create a scanner with the built-in parsers configured from `config`
    pub fn new(config: &Config) -> Self {
        let images = ImageParser::new(config.excluded_orgs.clone());
        let detector = UpstreamDetector::new(config.upstreams.clone());

        Self::with_parsers(vec![
            Box::new(ChartYamlParser::new(detector)),
            Box::new(ValuesYamlParser::new(images.clone())),
            Box::new(DockerfileParser::new(images)),
        ])
    }

    pub fn with_parsers(parsers: Vec<Box<dyn Parser>>) -> Self {
        Self { parsers }
    }

    /// Scan `root` recursively in file-name order.
    ///
    /// Unreadable entries and files that fail to parse are logged and skipped.
    /// Images are deduplicated on their raw reference text and charts on
    /// `name@version`; the first occurrence wins.
    pub fn scan(&self, root: &Path) -> Result<ScanResults, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        info!("Scanning {:?}", root);

        let mut results = ScanResults::default();
        let mut seen_images = HashSet::new();
        let mut seen_charts = HashSet::new();

        let entries = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| {
                entry
                    .inspect_err(|e| debug!("Skipping inaccessible entry: {}", e))
                    .ok()
            });

        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let Some(parser) = self.parsers.iter().find(|p| p.can_parse(&file_name)) else {
                continue;
            };

            let path = entry.path();
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {:?}: {}", path, e);
                    continue;
                }
            };

            let parsed = match parser.parse(&content, path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Failed to parse {:?}: {}", path, e);
                    continue;
                }
            };

            debug!(
                "Found {} images and {} charts in {:?}",
                parsed.images.len(),
                parsed.charts.len(),
                path
            );

            for image in parsed.images {
                if seen_images.insert(image.raw.clone()) {
                    results.images.push(image);
                }
            }
            for chart in parsed.charts {
                if seen_charts.insert(chart.key()) {
                    results.charts.push(chart);
                }
            }
        }

        info!(
            "Scan complete: {} images, {} charts",
            results.images.len(),
            results.charts.len()
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_collects_references_from_all_file_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "charts/app/Chart.yaml",
            "name: app\nversion: 1.0.0\ndependencies:\n  - name: postgresql\n    version: 12.1.6\n    repository: https://charts.bitnami.com/bitnami\n",
        );
        write(
            root,
            "charts/app/values.yaml",
            "image:\n  repository: bitnami/postgresql\n  tag: 11.14.0\n",
        );
        write(root, "docker/Dockerfile", "FROM alpine:3.19\n");
        write(root, "docker/README.md", "FROM ignored:1.0\n");

        let results = Scanner::new(&Config::default()).scan(root).unwrap();

        let images: Vec<_> = results.images.iter().map(|i| i.raw.as_str()).collect();
        assert_eq!(images, vec!["bitnami/postgresql:11.14.0", "alpine:3.19"]);

        let charts: Vec<_> = results.charts.iter().map(|c| c.key()).collect();
        assert_eq!(charts, vec!["app@1.0.0", "postgresql@12.1.6"]);
        assert_eq!(results.charts[1].upstream, "bitnami");
    }

    #[test]
    fn scan_deduplicates_keeping_first_location() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a/values.yaml", "image: nginx:1.25\n");
        write(root, "b/values.yaml", "x: 1\nimage: nginx:1.25\n");
        write(root, "a/Chart.yaml", "name: lib\nversion: 0.1.0\n");
        write(root, "b/Chart.yaml", "name: lib\nversion: 0.1.0\n");

        let results = Scanner::new(&Config::default()).scan(root).unwrap();

        assert_eq!(results.images.len(), 1);
        assert_eq!(results.images[0].path, root.join("a/values.yaml"));
        assert_eq!(results.images[0].line, 1);
        assert_eq!(results.charts.len(), 1);
        assert_eq!(results.charts[0].path, root.join("a/Chart.yaml"));
    }

    #[test]
    fn scan_skips_files_that_fail_to_parse() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "broken/values.yaml", "image: {unclosed\n");
        write(root, "ok/values.yaml", "image: redis:7.2\n");

        let results = Scanner::new(&Config::default()).scan(root).unwrap();

        assert_eq!(results.images.len(), 1);
        assert_eq!(results.images[0].raw, "redis:7.2");
    }

    #[test]
    fn scan_rejects_non_directory_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("values.yaml");
        fs::write(&file, "image: redis:7.2\n").unwrap();

        let result = Scanner::new(&Config::default()).scan(&file);

        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn scan_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();

        let result = Scanner::new(&Config::default()).scan(&temp_dir.path().join("missing"));

        assert!(matches!(result, Err(ScanError::Io { .. })));
    }

    #[test]
    fn scan_returns_empty_results_for_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let results = Scanner::new(&Config::default()).scan(temp_dir.path()).unwrap();

        assert!(results.is_empty());
    }
}
