//! Discrete zoom levels
//!
//! The viewer only ever scales pages by one of a fixed set of factors.
//! A zoom level is an index into [`ZOOM_LEVELS`].

/// A selectable zoom step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLevel {
    /// Label shown in the zoom dropdown
    pub label: &'static str,
    /// Scale factor handed to the document engine
    pub scale: f32,
}

/// Zoom steps in ascending order
pub const ZOOM_LEVELS: [ZoomLevel; 7] = [
    ZoomLevel { label: "50%", scale: 0.5 },
    ZoomLevel { label: "75%", scale: 0.75 },
    ZoomLevel { label: "100%", scale: 1.0 },
    ZoomLevel { label: "125%", scale: 1.25 },
    ZoomLevel { label: "150%", scale: 1.5 },
    ZoomLevel { label: "175%", scale: 1.75 },
    ZoomLevel { label: "200%", scale: 2.0 },
];

/// Index of the 100% step
pub const DEFAULT_ZOOM_INDEX: usize = 2;

/// Highest valid zoom index
pub const MAX_ZOOM_INDEX: usize = ZOOM_LEVELS.len() - 1;

/// Look up a zoom step, `None` when the index is out of the table
#[must_use]
pub fn zoom_level(index: usize) -> Option<ZoomLevel> {
    ZOOM_LEVELS.get(index).copied()
}

/// Scale factor for a zoom index, falling back to 100% for invalid indices
#[must_use]
pub fn scale_for(index: usize) -> f32 {
    zoom_level(index)
        .unwrap_or(ZOOM_LEVELS[DEFAULT_ZOOM_INDEX])
        .scale
}

#[must_use]
pub fn can_minify(index: usize) -> bool {
    index >= 1
}

#[must_use]
pub fn can_magnify(index: usize) -> bool {
    index < MAX_ZOOM_INDEX
}
