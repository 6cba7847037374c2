//! Image reference string parsing shared by the values.yaml and Dockerfile parsers

use std::path::Path;

use crate::parser::types::{DEFAULT_REGISTRY, DEFAULT_TAG, ImageReference};

/// Splits `[registry/]repository[:tag][@digest]` strings into [`ImageReference`]s
#[derive(Debug, Clone, Default)]
pub struct ImageParser {
    excluded_orgs: Vec<String>,
}

impl ImageParser {
    /// `excluded_orgs` are repository substrings whose images are marked skipped
    pub fn new(excluded_orgs: Vec<String>) -> Self {
        Self { excluded_orgs }
    }

    /// Parse `text` found at `path:line`.
    ///
    /// Returns `None` for values that are unlikely to be image references:
    /// empty strings, the bare word "latest", path-like strings and single
    /// words containing neither `/` nor `:`.
    pub fn parse(&self, text: &str, path: &Path, line: usize) -> Option<ImageReference> {
        let raw = text.trim();
        if raw.is_empty() || raw == DEFAULT_TAG {
            return None;
        }
        if raw.starts_with('/') || raw.starts_with('.') {
            return None;
        }
        if !raw.contains('/') && !raw.contains(':') {
            return None;
        }

        // First segment is a registry host only if it looks like one
        let (registry, remainder) = match raw.split_once('/') {
            Some((host, rest)) if host.contains('.') || host.contains(':') => (host, rest),
            _ => (DEFAULT_REGISTRY, raw),
        };

        // A digest pins content, not a tag
        let name = remainder
            .split_once('@')
            .map_or(remainder, |(name, _digest)| name);

        let (repository, tag) = name.rsplit_once(':').unwrap_or((name, DEFAULT_TAG));
        if repository.is_empty() {
            return None;
        }

        let skipped = self
            .excluded_orgs
            .iter()
            .any(|org| !org.is_empty() && repository.contains(org.as_str()));

        Some(ImageReference {
            registry: registry.to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
            raw: raw.to_string(),
            path: path.to_path_buf(),
            line,
            skipped,
        })
    }
}
