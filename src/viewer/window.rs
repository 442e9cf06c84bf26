//! Windowed rendering
//!
//! Only pages near the current one are kept drawn. Each display pass
//! computes a new window and diffs it against the one drawn before.

use std::ops::RangeInclusive;

/// Pages drawn on either side of the current page
pub const WINDOW_RADIUS: usize = 5;

/// Contiguous run of drawn pages, 1-based and inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderWindow {
    pub first: usize,
    pub last: usize,
}

impl RenderWindow {
    /// Window of pages within `radius` of `current`, clamped to the
    /// document. `None` for an empty document.
    #[must_use]
    pub fn around(current: usize, page_count: usize, radius: usize) -> Option<Self> {
        if page_count == 0 {
            return None;
        }

        let current = current.clamp(1, page_count);
        Some(Self {
            first: current.saturating_sub(radius).max(1),
            last: current.saturating_add(radius).min(page_count),
        })
    }

    #[must_use]
    pub fn contains(&self, page: usize) -> bool {
        self.pages().contains(&page)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last + 1 - self.first
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn pages(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// What a display pass has to do to move from one window to the next
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderPlan {
    /// Pages drawn before that fell out of the window
    pub release: Vec<usize>,
    /// Pages in the window that still need drawing
    pub draw: Vec<usize>,
}

impl RenderPlan {
    /// Diff `previous` against `next`.
    ///
    /// With `redraw_all` every page of `next` is drawn again, which is what a
    /// scale change needs.
    #[must_use]
    pub fn between(
        previous: Option<RenderWindow>,
        next: Option<RenderWindow>,
        redraw_all: bool,
    ) -> Self {
        let release = previous
            .map(|prev| {
                prev.pages()
                    .filter(|&page| !next.is_some_and(|n| n.contains(page)))
                    .collect()
            })
            .unwrap_or_default();

        let draw = next
            .map(|next| {
                next.pages()
                    .filter(|&page| redraw_all || !previous.is_some_and(|p| p.contains(page)))
                    .collect()
            })
            .unwrap_or_default();

        Self { release, draw }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.release.is_empty() && self.draw.is_empty()
    }
}
