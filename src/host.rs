//! Host editor contracts
//!
//! The extension never owns buffer text, decorations or popups. It talks to
//! the host through the [`View`] trait, and adapts to the host's API
//! generation through a [`HostProfile`] chosen once at startup.

use crate::model::event::BufferId;
use crate::model::region::Region;
use crate::primitives::patterns;
use bitflags::bitflags;
use regex::Regex;
use std::path::PathBuf;

/// Prefix of every decoration group key the extension creates
pub const DECORATION_KEY_PREFIX: &str = "remote-images-preview ";

/// Largest popup size, in host logical units
pub const POPUP_MAX_WIDTH: u32 = 1000;
pub const POPUP_MAX_HEIGHT: u32 = 1000;

/// First host version with async event handlers and popups
pub const CURRENT_API_VERSION: u32 = 3000;

/// First host version with native region underlines
pub const NATIVE_UNDERLINE_VERSION: u32 = 3019;

bitflags! {
    /// How the host draws a decoration group
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawFlags: u8 {
        /// Do not fill the region background
        const NO_FILL            = 0b0000_0001;
        /// Do not outline the region
        const NO_OUTLINE         = 0b0000_0010;
        /// Draw a stippled underline under the region
        const STIPPLED_UNDERLINE = 0b0000_0100;
        /// Draw empty regions as an underline of the following char
        const EMPTY_AS_OVERWRITE = 0b0000_1000;
    }
}

/// Options for a hover popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupOptions {
    /// Char offset the popup is anchored at
    pub location: usize,
    /// Hide the popup once the pointer leaves it
    pub hide_on_mouse_move_away: bool,
    pub max_width: u32,
    pub max_height: u32,
}

impl PopupOptions {
    /// Options used for every image preview
    pub fn preview_at(location: usize) -> Self {
        Self {
            location,
            hide_on_mouse_move_away: true,
            max_width: POPUP_MAX_WIDTH,
            max_height: POPUP_MAX_HEIGHT,
        }
    }
}

/// An open buffer as seen through the host editor
pub trait View: Send + Sync {
    /// Stable handle of this buffer
    fn id(&self) -> BufferId;

    /// Full text of the buffer
    fn text(&self) -> String;

    /// Text covered by a char-offset region
    fn substr(&self, region: Region) -> String {
        patterns::substr(&self.text(), region)
    }

    /// All matches of `pattern` over the buffer text, in order
    fn find_all(&self, pattern: &Regex) -> Vec<Region> {
        patterns::find_all(pattern, &self.text())
    }

    /// Lexical scope name at a char offset, e.g. `"source.python string.quoted"`
    fn scope_name(&self, offset: usize) -> String;

    /// Path of the file backing this buffer, if any
    fn file_name(&self) -> Option<PathBuf>;

    /// Create or replace the decoration group `key`
    fn add_regions(&self, key: &str, regions: &[Region], scope: &str, flags: DrawFlags);

    /// Remove the decoration group `key`
    fn erase_regions(&self, key: &str);

    /// Show a popup with HTML-like content
    fn show_popup(&self, content: &str, options: PopupOptions);
}

/// How scans for load and modify events are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Run on the event thread; only one handler runs at a time
    Blocking,
    /// Run on the background scan worker, serialized by the scan lock
    Worker,
}

/// Behavior that differs between host API generations
pub trait HostProfile: Send + Sync {
    /// How load and modify scans are dispatched
    fn dispatch_mode(&self) -> DispatchMode;

    /// Create or replace the underline group `key` covering `regions`,
    /// colored by `scope`
    fn underline(&self, view: &dyn View, key: &str, regions: &[Region], scope: &str);

    /// Whether the host can show popups at all
    fn supports_popups(&self) -> bool;

    /// Show a preview popup. Returns false when the host cannot show popups.
    fn show_preview(&self, view: &dyn View, markup: &str, point: usize) -> bool;
}

/// Choose the profile for a host version, once at startup
pub fn profile_for_version(version: u32) -> Box<dyn HostProfile> {
    if version < CURRENT_API_VERSION {
        Box::new(LegacyProfile)
    } else {
        Box::new(CurrentProfile {
            native_underline: version >= NATIVE_UNDERLINE_VERSION,
        })
    }
}

/// Blocking-dispatch hosts without native underlines or popups
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyProfile;

/// Hosts with async handlers and popups
#[derive(Debug, Clone, Copy)]
pub struct CurrentProfile {
    pub native_underline: bool,
}

impl Default for CurrentProfile {
    fn default() -> Self {
        Self {
            native_underline: true,
        }
    }
}

/// Underline by drawing one empty region per covered char
fn underline_with_empty_regions(view: &dyn View, key: &str, regions: &[Region], scope: &str) {
    let char_regions: Vec<Region> = regions
        .iter()
        .flat_map(|region| (region.start..region.end).map(|pos| Region::new(pos, pos)))
        .collect();
    view.add_regions(key, &char_regions, scope, DrawFlags::EMPTY_AS_OVERWRITE);
}

impl HostProfile for LegacyProfile {
    fn dispatch_mode(&self) -> DispatchMode {
        DispatchMode::Blocking
    }

    fn underline(&self, view: &dyn View, key: &str, regions: &[Region], scope: &str) {
        underline_with_empty_regions(view, key, regions, scope);
    }

    fn supports_popups(&self) -> bool {
        false
    }

    fn show_preview(&self, _view: &dyn View, _markup: &str, point: usize) -> bool {
        tracing::debug!("Host has no popup support, dropping preview at {}", point);
        false
    }
}

impl HostProfile for CurrentProfile {
    fn dispatch_mode(&self) -> DispatchMode {
        DispatchMode::Worker
    }

    fn underline(&self, view: &dyn View, key: &str, regions: &[Region], scope: &str) {
        if self.native_underline {
            view.add_regions(
                key,
                regions,
                scope,
                DrawFlags::NO_FILL | DrawFlags::NO_OUTLINE | DrawFlags::STIPPLED_UNDERLINE,
            );
        } else {
            underline_with_empty_regions(view, key, regions, scope);
        }
    }

    fn supports_popups(&self) -> bool {
        true
    }

    fn show_preview(&self, view: &dyn View, markup: &str, point: usize) -> bool {
        view.show_popup(markup, PopupOptions::preview_at(point));
        true
    }
}
