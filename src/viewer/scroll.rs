//! Scroll offset <-> page number mapping
//!
//! Pages are laid out in a single column, each followed by a fixed margin.
//! Page numbers are 1-based; `heights[i]` is the height of page `i + 1`.

/// Vertical gap between pages in pixels
pub const PAGE_MARGIN: f32 = 20.0;

/// Slack for float accumulation when comparing against the threshold
const THRESHOLD_SLACK_PX: f32 = 0.5;

/// Offset that puts the top of `page` at the top of the viewport.
///
/// Sums `height + margin` of every page before `page`. Page numbers past the
/// end yield the offset just below the last page.
#[must_use]
pub fn scroll_to_page(page: usize, heights: &[f32], margin: f32) -> f32 {
    heights
        .iter()
        .take(page.saturating_sub(1))
        .map(|&h| h + margin)
        .sum()
}

/// Page considered current at scroll `offset`.
///
/// Walks the pages accumulating `height + margin` and returns the first page
/// whose extent remaining below `offset` is positive and covers at least
/// half the viewport (or the whole page, for pages shorter than that).
/// Offsets past the end resolve to the last page. Returns `None` when there
/// are no pages.
#[must_use]
pub fn infer_page_from_scroll(
    offset: f32,
    viewport_height: f32,
    heights: &[f32],
    margin: f32,
) -> Option<usize> {
    if heights.is_empty() {
        return None;
    }

    let offset = offset.max(0.0);
    let half_viewport = (viewport_height / 2.0).max(0.0);
    let mut page_end = 0.0;

    for (index, &height) in heights.iter().enumerate() {
        let extent = height + margin;
        page_end += extent;

        let remaining = page_end - offset;
        if remaining > 0.0 && remaining >= half_viewport.min(extent) - THRESHOLD_SLACK_PX {
            return Some(index + 1);
        }
    }

    Some(heights.len())
}

/// Total scrollable height of the page column
#[must_use]
pub fn total_height(heights: &[f32], margin: f32) -> f32 {
    heights.iter().map(|&h| h + margin).sum()
}
