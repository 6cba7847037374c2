//! Latest tag selection
//!
//! Picks the "latest" tag from an unordered tag list relative to the tag
//! that is currently pinned:
//! - Version-like pinned tag: only candidates with the same `v`-prefix style
//!   are compared, and the highest numeric core wins. Suffixed tags such as
//!   `1.2.0-rc1` stay eligible here.
//! - Non-version pinned tag (`latest`, `stable`, ...): the highest version-like
//!   tag without a `-` suffix wins, falling back to the first tag.

use crate::version::semver::{LooseVersion, has_v_prefix, is_version_like};

/// Select the latest tag from `tags` relative to `pinned`.
///
/// Returns an empty string only when `tags` is empty. Otherwise the result is
/// a member of `tags` or `pinned` itself when no tag shares its style.
pub fn select_latest(tags: &[String], pinned: &str) -> String {
    if tags.is_empty() {
        return String::new();
    }

    if !is_version_like(pinned) {
        let stable = tags
            .iter()
            .filter(|tag| is_version_like(tag) && !tag.contains('-'));
        return highest(stable).unwrap_or(&tags[0]).clone();
    }

    let pinned_has_v = has_v_prefix(pinned);
    let same_style = tags
        .iter()
        .filter(|tag| is_version_like(tag) && has_v_prefix(tag) == pinned_has_v);

    highest(same_style)
        .cloned()
        .unwrap_or_else(|| pinned.to_string())
}

/// Highest tag by numeric core; the earliest tag wins ties
fn highest<'a>(tags: impl Iterator<Item = &'a String>) -> Option<&'a String> {
    tags.filter_map(|tag| LooseVersion::parse(tag).map(|version| (tag, version)))
        .fold(None::<(&'a String, LooseVersion)>, |best, (tag, version)| match best {
            Some((_, best_version)) if version <= best_version => best,
            _ => Some((tag, version)),
        })
        .map(|(tag, _)| tag)
}
