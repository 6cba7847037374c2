//! Chart upstream detection driven by the configured rule tables

use crate::config::UpstreamsConfig;

/// Resolves which catalog a chart is published in
#[derive(Debug, Clone, Default)]
pub struct UpstreamDetector {
    config: UpstreamsConfig,
}

impl UpstreamDetector {
    pub fn new(config: UpstreamsConfig) -> Self {
        Self { config }
    }

    /// Upstream id for a chart's own Chart.yaml, or an empty string for local charts.
    ///
    /// The first rule whose name and path conditions both hold wins.
    pub fn detect_chart(&self, name: &str, path: &str) -> String {
        let name = name.to_lowercase();
        let path = path.replace('\\', "/").to_lowercase();

        self.config
            .chart_rules
            .iter()
            .find(|rule| {
                let name_matches = rule
                    .name
                    .as_ref()
                    .is_none_or(|expected| expected.to_lowercase() == name);
                let path_matches = rule
                    .path_contains
                    .as_ref()
                    .is_none_or(|needle| path.contains(&needle.to_lowercase()));
                name_matches && path_matches
            })
            .map(|rule| rule.upstream.clone())
            .unwrap_or_default()
    }

    /// Upstream id for a dependency declared with the given repository URL
    pub fn detect_dependency(&self, repository: &str) -> String {
        self.config
            .dependency_rules
            .iter()
            .find(|rule| repository.contains(rule.repository_contains.as_str()))
            .map(|rule| rule.upstream.clone())
            .unwrap_or_default()
    }
}
