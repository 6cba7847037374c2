//! Lookup results returned by upstream registries

/// Tags listed for one image repository and the one selected as latest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub latest: String,
    pub all_tags: Vec<String>,
}

/// Latest published version of a Helm chart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartVersionInfo {
    pub latest_version: String,
    pub app_version: String,
}
