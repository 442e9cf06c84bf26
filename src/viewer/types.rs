//! Core value types shared by the viewer modules

/// Page dimensions in pixels at a given scale
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Dimensions after multiplying by `scale`
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            width: self.width * scale,
            height: self.height * scale,
        }
    }
}

/// Identifies one load of a document source.
///
/// Bumped on every source change so results of superseded loads can be
/// recognised and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Page change requested by the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageChange {
    /// Requested page (1-based)
    pub page: usize,
    /// True for explicit navigation, false when inferred from scrolling
    pub manual: bool,
}
