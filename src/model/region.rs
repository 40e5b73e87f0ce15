//! Match regions and the per-buffer match set
//!
//! Regions are half-open char-offset spans, matching how the host editor
//! addresses buffer text. A `BufferMatches` is produced fresh on every
//! rescan and is never mutated afterwards, only replaced wholesale.

use serde::{Deserialize, Serialize};

/// Half-open span `[start, end)` of char offsets into a buffer's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of chars covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this region contains a point
    pub fn contains(&self, point: usize) -> bool {
        self.start <= point && point < self.end
    }
}

/// Category of an image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// `http://` or `https://` URL ending in an image extension
    AbsoluteUrl,
    /// Inline `data:image/...` literal
    DataUri,
    /// Path to an image file, resolved against the buffer's directory
    RelativePath,
}

impl MatchKind {
    /// Order in which categories are consulted when resolving a hover.
    /// The first category with a containing region wins.
    pub const PRIORITY: [MatchKind; 3] = [
        MatchKind::AbsoluteUrl,
        MatchKind::DataUri,
        MatchKind::RelativePath,
    ];

    /// Whether matches of this kind count toward `max_url_limit`
    pub fn counts_toward_limit(self) -> bool {
        !matches!(self, MatchKind::RelativePath)
    }
}

/// Regions found in one buffer by the last successful scan, one ordered
/// sequence per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferMatches {
    pub urls: Vec<Region>,
    pub data_uris: Vec<Region>,
    pub relative_paths: Vec<Region>,
}

impl BufferMatches {
    /// Regions of one category, in scan order
    pub fn of_kind(&self, kind: MatchKind) -> &[Region] {
        match kind {
            MatchKind::AbsoluteUrl => &self.urls,
            MatchKind::DataUri => &self.data_uris,
            MatchKind::RelativePath => &self.relative_paths,
        }
    }

    pub(crate) fn of_kind_mut(&mut self, kind: MatchKind) -> &mut Vec<Region> {
        match kind {
            MatchKind::AbsoluteUrl => &mut self.urls,
            MatchKind::DataUri => &mut self.data_uris,
            MatchKind::RelativePath => &mut self.relative_paths,
        }
    }

    /// All regions concatenated: urls, then data URIs, then relative paths
    pub fn all(&self) -> Vec<Region> {
        MatchKind::PRIORITY
            .iter()
            .flat_map(|kind| self.of_kind(*kind).iter().copied())
            .collect()
    }

    /// Total number of matches that count toward the per-buffer limit
    pub fn counted_len(&self) -> usize {
        MatchKind::PRIORITY
            .iter()
            .filter(|kind| kind.counts_toward_limit())
            .map(|kind| self.of_kind(*kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        MatchKind::PRIORITY
            .iter()
            .all(|kind| self.of_kind(*kind).is_empty())
    }

    /// First region of `kind`, in scan order, that contains `point`
    pub fn first_containing(&self, kind: MatchKind, point: usize) -> Option<Region> {
        self.of_kind(kind)
            .iter()
            .find(|region| region.contains(point))
            .copied()
    }
}
