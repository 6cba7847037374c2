//! values.yaml parser

use std::path::Path;

use crate::parser::image::ImageParser;
use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::{DEFAULT_TAG, ParsedFile};
use crate::parser::yaml::{YamlNode, parse_document};

/// Parser for Helm values files (values.yaml)
///
/// Recognizes two shapes anywhere in the document:
/// - `repository: <repo>` with an optional sibling `tag: <tag>`
/// - `image: <full reference>`
pub struct ValuesYamlParser {
    images: ImageParser,
}

impl ValuesYamlParser {
    pub fn new(images: ImageParser) -> Self {
        Self { images }
    }
}

impl Default for ValuesYamlParser {
    fn default() -> Self {
        Self::new(ImageParser::default())
    }
}

impl Parser for ValuesYamlParser {
    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "values.yaml"
    }

    fn parse(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError> {
        let Some(doc) = parse_document(content)? else {
            return Ok(ParsedFile::default());
        };

        let mut results = Vec::new();
        doc.walk(&mut |mapping, key, value| {
            let Some(scalar) = value.as_scalar() else {
                return;
            };

            match key {
                "repository" => {
                    let tag = mapping
                        .get("tag")
                        .and_then(YamlNode::as_scalar)
                        .map(|tag| tag.value.as_str())
                        .filter(|tag| !tag.is_empty())
                        .unwrap_or(DEFAULT_TAG);
                    let candidate = format!("{}:{}", scalar.value, tag);
                    results.extend(self.images.parse(&candidate, path, scalar.line));
                }
                "image" => {
                    results.extend(self.images.parse(&scalar.value, path, scalar.line));
                }
                _ => {}
            }
        });

        Ok(ParsedFile::images(results))
    }
}
