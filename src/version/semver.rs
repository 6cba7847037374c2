//! Loose version parsing for container tags and chart versions
//!
//! Tags are classified by a prefix match of `v?MAJOR[.MINOR[.PATCH]]`;
//! anything after the numeric groups is ignored for ordering.

use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid version pattern")
});

/// Numeric core of a version-like tag. Missing components are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LooseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl LooseVersion {
    /// Parse the numeric prefix of `tag`.
    ///
    /// Examples:
    /// - "1" -> (1, 0, 0)
    /// - "v1.2" -> (1, 2, 0)
    /// - "1.2.0-rc1" -> (1, 2, 0)
    /// - "latest" -> None
    pub fn parse(tag: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.captures(tag)?;
        let component = |index: usize| {
            captures
                .get(index)
                .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
                .unwrap_or(0)
        };

        Some(Self {
            major: component(1),
            minor: component(2),
            patch: component(3),
        })
    }
}

/// Whether `tag` starts with the version pattern
pub fn is_version_like(tag: &str) -> bool {
    VERSION_PATTERN.is_match(tag)
}

/// Whether `tag` carries a literal `v` prefix
pub fn has_v_prefix(tag: &str) -> bool {
    tag.starts_with('v')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some((1, 0, 0)))]
    #[case("1.2", Some((1, 2, 0)))]
    #[case("1.2.3", Some((1, 2, 3)))]
    #[case("v1.2.3", Some((1, 2, 3)))]
    #[case("1.2.0-rc1", Some((1, 2, 0)))]
    #[case("410", Some((410, 0, 0)))]
    #[case("3.19.1-alpine", Some((3, 19, 1)))]
    #[case("1.2.3.4", Some((1, 2, 3)))]
    #[case("latest", None)]
    #[case("stable", None)]
    #[case("v", None)]
    #[case("", None)]
    fn parse_extracts_numeric_prefix(#[case] tag: &str, #[case] expected: Option<(u64, u64, u64)>) {
        assert_eq!(
            LooseVersion::parse(tag).map(|v| (v.major, v.minor, v.patch)),
            expected
        );
    }

    #[test]
    fn has_v_prefix_checks_literal_prefix() {
        assert!(has_v_prefix("v1.0.0"));
        assert!(!has_v_prefix("1.0.0"));
        assert!(!has_v_prefix("V1.0.0"));
    }
}
