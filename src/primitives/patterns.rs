//! Image reference patterns and char-offset search helpers
//!
//! The patterns are best-effort heuristics, not a URL grammar. They are
//! compiled once and shared by every scan.
//!
//! The `regex` crate reports byte offsets, while the host editor addresses
//! text by char. `find_all` converts so that regions can be handed straight
//! back to the host.

use crate::model::region::{MatchKind, Region};
use regex::Regex;
use std::sync::LazyLock;

/// Absolute `http`/`https` URL ending in `.jpg`, `.gif` or `.png`
pub const URL_PATTERN: &str =
    r"\bhttps?://[-A-Za-z0-9+&@#/%?=~_()|!:,.;']*[-A-Za-z0-9+&@#/%=~_(|]\.(jpg|gif|png)";

/// Inline `data:image/...` literal
pub const DATA_URI_PATTERN: &str = r"\bdata:image/[\w/+]+;(charset=[\w-]+|base64).*,(.*)\b";

/// Path-like run of characters ending in `.jpg`, `.gif` or `.png`
pub const RELATIVE_PATH_PATTERN: &str =
    r"[-A-Za-z0-9+&@#/%?~_|!:,.;]*[-A-Za-z0-9+&@#/%=~_(|]\.(jpg|gif|png)";

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL pattern is valid"));
static DATA_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATA_URI_PATTERN).expect("data URI pattern is valid"));
static RELATIVE_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RELATIVE_PATH_PATTERN).expect("relative path pattern is valid"));

/// Compiled pattern for a match category
pub fn pattern_for(kind: MatchKind) -> &'static Regex {
    match kind {
        MatchKind::AbsoluteUrl => &URL_REGEX,
        MatchKind::DataUri => &DATA_URI_REGEX,
        MatchKind::RelativePath => &RELATIVE_PATH_REGEX,
    }
}

/// Find all non-overlapping matches of `pattern` in `text`, as char-offset regions
pub fn find_all(pattern: &Regex, text: &str) -> Vec<Region> {
    let mut regions = Vec::new();
    // Matches arrive in increasing byte order, so offsets can be converted
    // with a single forward walk over the text.
    let mut byte_pos = 0;
    let mut char_pos = 0;
    let mut advance = |target: usize| -> usize {
        char_pos += text[byte_pos..target].chars().count();
        byte_pos = target;
        char_pos
    };

    for m in pattern.find_iter(text) {
        let start = advance(m.start());
        let end = advance(m.end());
        regions.push(Region::new(start, end));
    }
    regions
}

/// Extract the text covered by a char-offset region.
/// Out-of-range regions are clamped to the end of the text.
pub fn substr(text: &str, region: Region) -> String {
    text.chars()
        .skip(region.start)
        .take(region.len())
        .collect()
}
