//! @mention extraction from tweet text.

use std::sync::LazyLock;

use regex::Regex;

/// `@` followed by 1–15 handle characters. No word boundary is required on
/// either side, so `a@b` and the first 15 characters of an over-long run
/// both match.
static RE_MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]{1,15})").unwrap());

/// Handles mentioned in `text`, in order of appearance, lower-cased.
///
/// Duplicates are kept: `"@a @a"` yields `a` twice.
pub fn extract_mentions(text: &str) -> impl Iterator<Item = String> + '_ {
    RE_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| normalize_handle(m.as_str()))
}

/// Canonical form of a handle for comparison: lower-cased.
pub fn normalize_handle(handle: &str) -> String {
    handle.to_lowercase()
}
