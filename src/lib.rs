//! Image reference previews for editor buffers.
//!
//! Scans open buffers for image references (remote URLs, inline data URIs
//! and paths relative to the buffer's file), underlines them, and shows an
//! inline preview popup when the pointer hovers over one.
//!
//! The host editor is reached only through [`host::View`] and
//! [`host::HostProfile`]; everything else is owned by
//! [`RemoteImagesPreview`].

pub mod config;
pub mod host;
pub mod listener;
pub mod model;
pub mod primitives;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, ConfigError};
pub use host::{profile_for_version, CurrentProfile, HostProfile, LegacyProfile, View};
pub use listener::RemoteImagesPreview;
pub use model::event::{BufferId, EditorEvent, HoverZone};
pub use model::region::{BufferMatches, MatchKind, Region};
