//! Toolbar model derived from the view state

use super::handlers::{can_page_down, can_page_up};
use super::state::{LoadPhase, ViewState};
use super::zoom::{self, ZOOM_LEVELS};

/// One entry of the zoom dropdown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoomOption {
    pub label: &'static str,
    pub selected: bool,
}

/// Everything a host needs to draw the toolbar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolbarModel {
    pub page_up_enabled: bool,
    pub page_down_enabled: bool,
    /// Value of the page number input
    pub page_input: usize,
    /// Upper bound of the page number input
    pub page_input_max: usize,
    /// "of N", empty until the page count is known
    pub page_count_label: String,
    pub minify_enabled: bool,
    pub magnify_enabled: bool,
    pub zoom_options: Vec<ZoomOption>,
    /// Load status, with the failure reason when loading failed
    pub status: Option<String>,
}

impl ToolbarModel {
    #[must_use]
    pub fn from_state(state: &ViewState) -> Self {
        let page_count_label = if state.page_count > 0 {
            format!("of {}", state.page_count)
        } else {
            String::new()
        };

        let zoom_options = ZOOM_LEVELS
            .iter()
            .enumerate()
            .map(|(index, level)| ZoomOption {
                label: level.label,
                selected: index == state.zoom_index,
            })
            .collect();

        let status = match &state.phase {
            LoadPhase::Unloaded | LoadPhase::Loaded => None,
            LoadPhase::Loading => Some(format!(
                "Loading {}/{}",
                state.base_sizes.len(),
                state.page_count
            )),
            LoadPhase::Failed { reason } => Some(format!("Failed: {reason}")),
        };

        Self {
            page_up_enabled: can_page_up(state),
            page_down_enabled: can_page_down(state),
            page_input: state.page_num,
            page_input_max: state.page_count,
            page_count_label,
            minify_enabled: zoom::can_minify(state.zoom_index),
            magnify_enabled: zoom::can_magnify(state.zoom_index),
            zoom_options,
            status,
        }
    }

    /// Label of the selected zoom option
    #[must_use]
    pub fn zoom_label(&self) -> &'static str {
        self.zoom_options
            .iter()
            .find(|option| option.selected)
            .map_or("", |option| option.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_toolbar_has_everything_paging_disabled() {
        let toolbar = ToolbarModel::from_state(&ViewState::default());
        assert!(!toolbar.page_up_enabled);
        assert!(!toolbar.page_down_enabled);
        assert_eq!(toolbar.page_count_label, "");
        assert_eq!(toolbar.zoom_label(), "100%");
        assert_eq!(toolbar.status, None);

        let mut state = ViewState::default();
        state.page_num = 3;
        assert!(!ToolbarModel::from_state(&state).page_up_enabled);
    }

    #[test]
    fn zoom_bounds_disable_buttons() {
        let mut state = ViewState::default();
        state.zoom_index = 0;
        let toolbar = ToolbarModel::from_state(&state);
        assert!(!toolbar.minify_enabled);
        assert!(toolbar.magnify_enabled);
        assert_eq!(toolbar.zoom_label(), "50%");

        state.zoom_index = 6;
        let toolbar = ToolbarModel::from_state(&state);
        assert!(toolbar.minify_enabled);
        assert!(!toolbar.magnify_enabled);
        assert_eq!(toolbar.zoom_label(), "200%");
    }

    #[test]
    fn page_count_label_and_input() {
        let mut state = ViewState::default();
        state.page_num = 4;
        state.page_count = 12;
        let toolbar = ToolbarModel::from_state(&state);
        assert_eq!(toolbar.page_count_label, "of 12");
        assert_eq!(toolbar.page_input, 4);
        assert_eq!(toolbar.page_input_max, 12);
        assert!(toolbar.page_up_enabled && toolbar.page_down_enabled);
    }

    #[test]
    fn failure_reason_is_shown() {
        let mut state = ViewState::default();
        state.phase = LoadPhase::Failed {
            reason: "cannot open a.pdf: offline".into(),
        };
        let toolbar = ToolbarModel::from_state(&state);
        assert_eq!(
            toolbar.status.as_deref(),
            Some("Failed: cannot open a.pdf: offline")
        );
    }
}
