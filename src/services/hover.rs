//! Hover resolver
//!
//! Maps a pointer position back to a cached match region and builds the
//! preview markup for it. Only reads the match cache; never scans.

use crate::host::{HostProfile, View};
use crate::model::event::HoverZone;
use crate::model::region::{MatchKind, Region};
use crate::services::image_loader::ImageLoader;
use crate::state::BufferRegistry;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inline image tag for raw bytes. The mime type is always PNG; hosts sniff
/// the real format from the payload.
pub fn image_tag_from_bytes(bytes: &[u8]) -> String {
    format!(r#"<img src="data:image/png;base64,{}">"#, STANDARD.encode(bytes))
}

/// Inline image tag for a data URI found verbatim in the buffer
pub fn image_tag_from_data_uri(data_uri: &str) -> String {
    format!(r#"<img src="{}">"#, data_uri)
}

/// Preview content ready to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Category of the region that produced the preview
    pub kind: MatchKind,
    /// Region under the pointer
    pub region: Region,
    /// Popup markup
    pub markup: String,
}

/// Resolves hovers against the per-buffer match cache
pub struct HoverResolver {
    registry: Arc<BufferRegistry>,
    loader: Arc<dyn ImageLoader>,
}

impl HoverResolver {
    pub fn new(registry: Arc<BufferRegistry>, loader: Arc<dyn ImageLoader>) -> Self {
        Self { registry, loader }
    }

    /// Resolve a hover and show the preview popup, if any.
    /// Returns true when a popup was requested. Hosts without popups are
    /// skipped before anything is fetched or read.
    pub fn resolve_hover(
        &self,
        profile: &dyn HostProfile,
        view: &dyn View,
        point: usize,
        zone: HoverZone,
    ) -> bool {
        if !profile.supports_popups() {
            return false;
        }
        match self.resolve(view, point, zone) {
            Some(preview) => profile.show_preview(view, &preview.markup, point),
            None => false,
        }
    }

    /// Build the preview for the region under `point` without showing it.
    ///
    /// Categories are tried in [`MatchKind::PRIORITY`] order and the first
    /// one with a containing region wins, even if building its preview fails.
    pub fn resolve(&self, view: &dyn View, point: usize, zone: HoverZone) -> Option<Preview> {
        if zone != HoverZone::Text {
            return None;
        }
        let matches = self.registry.matches(view.id())?;

        let (kind, region) = MatchKind::PRIORITY
            .iter()
            .find_map(|kind| Some((*kind, matches.first_containing(*kind, point)?)))?;

        let text = view.substr(region);
        let markup = match kind {
            MatchKind::AbsoluteUrl => self.remote_preview(&text),
            MatchKind::DataUri => Some(image_tag_from_data_uri(&text)),
            MatchKind::RelativePath => self.file_preview(view.file_name().as_deref(), &text),
        }?;

        Some(Preview {
            kind,
            region,
            markup,
        })
    }

    fn remote_preview(&self, url: &str) -> Option<String> {
        match self.loader.fetch(url) {
            Ok(bytes) => Some(image_tag_from_bytes(&bytes)),
            Err(e) => {
                tracing::debug!("No preview for {}: {:#}", url, e);
                None
            }
        }
    }

    fn file_preview(&self, buffer_file: Option<&Path>, relative_path: &str) -> Option<String> {
        let Some(buffer_file) = buffer_file else {
            tracing::debug!("Buffer has no file, cannot resolve {}", relative_path);
            return None;
        };
        let path = resolve_relative(buffer_file, relative_path);
        if !path.is_file() {
            tracing::debug!("No image file at {}", path.display());
            return None;
        }

        match self.read_image(&path) {
            Ok(bytes) => Some(image_tag_from_bytes(&bytes)),
            Err(e) => {
                tracing::debug!("No preview for {}: {:#}", path.display(), e);
                None
            }
        }
    }

    fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        self.loader
            .read_file(path)
            .with_context(|| format!("Image file {} vanished or is unreadable", path.display()))
    }
}

/// Resolve `relative_path` against the directory holding `buffer_file`.
/// A leading `/` is treated as part of the relative path, not as a root.
pub fn resolve_relative(buffer_file: &Path, relative_path: &str) -> PathBuf {
    let dir = buffer_file.parent().unwrap_or_else(|| Path::new(""));
    dir.join(relative_path.trim_start_matches('/'))
}
