//! Toolbar interaction handlers
//!
//! Clicks and input on the toolbar never change the view state directly.
//! They turn into requests to the owner, who decides whether to feed the
//! new value back through the `page_num` / `zoom_index` properties.

use log::warn;

use super::state::ViewState;
use super::types::PageChange;
use super::zoom;

/// User interaction with the viewer
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    PageUp,
    PageDown,
    /// Text committed in the page number input
    GoToPage(String),
    /// Zoom dropdown selection
    SelectZoom(usize),
    Magnify,
    Minify,
    /// Page column scrolled to `offset` with a viewport `viewport_height` tall
    Scroll { offset: f32, viewport_height: f32 },
}

/// Change request for the owner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Page(PageChange),
    Zoom(usize),
}

/// Map a toolbar interaction to a request.
///
/// Returns `None` when the matching control is disabled or the input is
/// unusable. Scroll interactions are state commands, not requests.
#[must_use]
pub fn request_for(state: &ViewState, interaction: &Interaction) -> Option<Request> {
    let manual = |page| Request::Page(PageChange { page, manual: true });

    match interaction {
        Interaction::PageUp => can_page_up(state).then(|| manual(state.page_num - 1)),
        Interaction::PageDown => can_page_down(state).then(|| manual(state.page_num + 1)),
        Interaction::GoToPage(input) => {
            if state.page_count == 0 {
                return None;
            }
            match input.trim().parse::<i64>() {
                Ok(value) => {
                    let page = value.clamp(1, state.page_count as i64) as usize;
                    Some(manual(page))
                }
                Err(e) => {
                    warn!("Ignoring page input {input:?}: {e}");
                    None
                }
            }
        }
        Interaction::SelectZoom(index) => zoom::zoom_level(*index).map(|_| Request::Zoom(*index)),
        Interaction::Magnify => {
            zoom::can_magnify(state.zoom_index).then(|| Request::Zoom(state.zoom_index + 1))
        }
        Interaction::Minify => {
            zoom::can_minify(state.zoom_index).then(|| Request::Zoom(state.zoom_index - 1))
        }
        Interaction::Scroll { .. } => None,
    }
}

/// Page up is enabled from page 2 on, once the page count is known
#[must_use]
pub fn can_page_up(state: &ViewState) -> bool {
    state.page_count > 0 && state.page_num >= 2
}

/// Page down is enabled before the last page
#[must_use]
pub fn can_page_down(state: &ViewState) -> bool {
    state.page_num < state.page_count
}
