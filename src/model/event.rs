use serde::{Deserialize, Serialize};

/// Unique identifier for a buffer, assigned by the host editor.
/// All per-buffer state is keyed by this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub usize);

/// Where the pointer was when a hover event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverZone {
    /// Over rendered text
    Text,
    /// Over the line number gutter
    Gutter,
    /// Over the margin to the left of the text
    Margin,
}

/// Editor lifecycle and pointer events delivered to the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Buffer became the active one
    Activated { buffer_id: BufferId },

    /// Buffer finished loading its backing file
    Loaded { buffer_id: BufferId },

    /// Buffer text was modified
    Modified { buffer_id: BufferId },

    /// Buffer was closed
    Closed { buffer_id: BufferId },

    /// Pointer rests over the buffer
    Hover {
        buffer_id: BufferId,
        /// Char offset under the pointer
        point: usize,
        zone: HoverZone,
    },
}

impl EditorEvent {
    /// The buffer this event targets
    pub fn buffer_id(&self) -> BufferId {
        match self {
            Self::Activated { buffer_id }
            | Self::Loaded { buffer_id }
            | Self::Modified { buffer_id }
            | Self::Closed { buffer_id }
            | Self::Hover { buffer_id, .. } => *buffer_id,
        }
    }
}
