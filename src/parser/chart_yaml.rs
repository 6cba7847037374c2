//! Chart.yaml parser

use std::path::Path;

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::{ChartReference, ParsedFile};
use crate::parser::upstream::UpstreamDetector;
use crate::parser::yaml::{YamlNode, parse_document};

/// Parser for Helm chart metadata files (Chart.yaml)
///
/// Emits one reference for the chart itself followed by one per entry under
/// `dependencies:`.
pub struct ChartYamlParser {
    detector: UpstreamDetector,
}

impl ChartYamlParser {
    pub fn new(detector: UpstreamDetector) -> Self {
        Self { detector }
    }
}

impl Default for ChartYamlParser {
    fn default() -> Self {
        Self::new(UpstreamDetector::default())
    }
}

impl Parser for ChartYamlParser {
    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "Chart.yaml"
    }

    fn parse(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError> {
        let doc = match parse_document(content)? {
            Some(doc @ YamlNode::Mapping(_)) => doc,
            Some(_) => {
                return Err(ParseError::ParseFailed(
                    "Chart.yaml is not a mapping".to_string(),
                ));
            }
            None => return Ok(ParsedFile::default()),
        };

        let path_text = path.to_string_lossy();
        let name = doc.str_value("name");

        let mut charts = vec![ChartReference {
            name: name.to_string(),
            version: doc.str_value("version").to_string(),
            app_version: doc.str_value("appVersion").to_string(),
            path: path.to_path_buf(),
            line: value_line(&doc),
            upstream: self.detector.detect_chart(name, &path_text),
        }];

        let dependencies = doc
            .get("dependencies")
            .and_then(YamlNode::as_sequence)
            .unwrap_or_default();

        for dependency in dependencies {
            charts.push(ChartReference {
                name: dependency.str_value("name").to_string(),
                version: dependency.str_value("version").to_string(),
                app_version: String::new(),
                path: path.to_path_buf(),
                line: value_line(dependency),
                upstream: self
                    .detector
                    .detect_dependency(dependency.str_value("repository")),
            });
        }

        Ok(ParsedFile::charts(charts))
    }
}

/// Line of the `version` scalar, falling back to `name`
fn value_line(node: &YamlNode) -> usize {
    ["version", "name"]
        .iter()
        .find_map(|key| node.get(key).and_then(YamlNode::as_scalar))
        .map(|scalar| scalar.line)
        .unwrap_or(0)
}
