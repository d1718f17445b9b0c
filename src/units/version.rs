//! Version extraction and comparison.

use regex::Regex;
use std::sync::LazyLock;

/// First dotted numeric run, e.g. `2.16.0` out of `Az.Storage 2.16.0 PSGallery`.
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").expect("VERSION_REGEX must compile"));

/// Pull a version string out of command output.
pub fn extract_version(text: &str) -> Option<String> {
    VERSION_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Compare versions to check if `candidate` is newer than `current`.
///
/// Components are compared numerically; missing trailing components count
/// as zero, so `1.2` and `1.2.0` are equal.
pub fn is_newer_version(candidate: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split('.')
            .map(|s| s.parse().unwrap_or(0))
            .collect()
    };

    let a = parse(candidate);
    let b = parse(current);
    let len = a.len().max(b.len());

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x > y;
        }
    }
    false
}
