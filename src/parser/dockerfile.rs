//! Dockerfile parser
//!
//! Extracts base images from `FROM` instructions, substituting `ARG`
//! defaults and skipping `scratch` and references to earlier build stages.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::parser::image::ImageParser;
use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::ParsedFile;

static ARG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ARG\s+(\w+)(?:=(.*))?$").expect("valid ARG pattern"));

static FROM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^FROM\s+(?:--\S+\s+)*(\S+)(?:\s+AS\s+(\S+))?").expect("valid FROM pattern")
});

/// `$VAR`, `${VAR}` and `${VAR:-default}`
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?(\w+)(?::-([^}]*))?\}?").expect("valid variable pattern")
});

/// Parser for Dockerfiles (`Dockerfile`, `*.dockerfile`, `Dockerfile.*`)
pub struct DockerfileParser {
    images: ImageParser,
}

impl DockerfileParser {
    pub fn new(images: ImageParser) -> Self {
        Self { images }
    }
}

impl Default for DockerfileParser {
    fn default() -> Self {
        Self::new(ImageParser::default())
    }
}

impl Parser for DockerfileParser {
    fn can_parse(&self, file_name: &str) -> bool {
        is_dockerfile(file_name)
    }

    fn parse(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError> {
        let mut images = Vec::new();
        // ARG name -> default value; bare `ARG X` is never recorded
        let mut args: HashMap<String, String> = HashMap::new();
        // Lowercased stage names introduced by `FROM ... AS name`
        let mut stages: HashSet<String> = HashSet::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(captures) = ARG_PATTERN.captures(line) {
                let value = captures
                    .get(2)
                    .map(|m| m.as_str().trim().trim_matches(|c| c == '"' || c == '\''))
                    .unwrap_or_default();
                if !value.is_empty() {
                    args.insert(captures[1].to_string(), value.to_string());
                }
                continue;
            }

            let Some(captures) = FROM_PATTERN.captures(line) else {
                continue;
            };

            let resolved = resolve_variables(&captures[1], &args);
            let stage = captures.get(2).map(|m| m.as_str().to_lowercase());

            let is_base_image = !resolved.contains('$')
                && !resolved.eq_ignore_ascii_case("scratch")
                && !stages.contains(&resolved.to_lowercase());

            if is_base_image {
                images.extend(self.images.parse(&resolved, path, index + 1));
            }

            if let Some(stage) = stage {
                stages.insert(stage);
            }
        }

        Ok(ParsedFile::images(images))
    }
}

/// Matches `Dockerfile`, `*.dockerfile` and `Dockerfile.*`, case-insensitively
pub fn is_dockerfile(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower == "dockerfile" || lower.ends_with(".dockerfile") || lower.starts_with("dockerfile.")
}

/// Substitute variables from ARG defaults, then inline `:-` defaults.
/// Anything unresolvable is left in place.
fn resolve_variables(reference: &str, args: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(reference, |captures: &Captures| {
            if let Some(value) = args.get(&captures[1]) {
                return value.clone();
            }
            match captures.get(2) {
                Some(default) if !default.as_str().is_empty() => default.as_str().to_string(),
                _ => captures[0].to_string(),
            }
        })
        .into_owned()
}
