//! View state machine
//!
//! `ViewState` is an immutable value. Every input the viewer receives (a
//! property change from the owner, a scroll event, a loader result, a settle
//! tick) is expressed as a [`Command`]; [`ViewState::apply`] returns the next
//! state together with the [`Effect`]s the component has to carry out.

use log::{debug, warn};

use super::scroll::{PAGE_MARGIN, infer_page_from_scroll, scroll_to_page};
use super::types::{Generation, PageChange, Viewport};
use super::window::{RenderPlan, RenderWindow, WINDOW_RADIUS};
use super::zoom::{self, DEFAULT_ZOOM_INDEX};

/// Where the current document is in its lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadPhase {
    /// No source set
    #[default]
    Unloaded,
    /// Document open or page fetches in flight
    Loading,
    /// Every page handle constructed
    Loaded,
    /// Open or a page fetch failed
    Failed { reason: String },
}

impl LoadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "Unloaded",
            Self::Loading => "Loading",
            Self::Loaded => "Loaded",
            Self::Failed { .. } => "Failed",
        }
    }
}

/// Layout constants the state machine works with
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Pages kept drawn on each side of the current page
    pub window_radius: usize,
    /// Gap between pages in pixels
    pub page_margin: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            window_radius: WINDOW_RADIUS,
            page_margin: PAGE_MARGIN,
        }
    }
}

/// Complete state of one viewer
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Document locator
    pub src: String,
    /// Current page (1-based), as supplied by the owner or inferred from scroll
    pub page_num: usize,
    /// Index into the zoom table
    pub zoom_index: usize,
    pub phase: LoadPhase,
    /// Generation of the load for `src`
    pub generation: Generation,
    /// Page count reported by the engine, 0 until the document opens
    pub page_count: usize,
    /// Page sizes at scale 1.0, filled in page order while loading
    pub base_sizes: Vec<Viewport>,
    /// Pages currently drawn
    pub window: Option<RenderWindow>,
    /// Last known scroll offset of the page column
    pub scroll_offset: f32,
    /// Last known height of the scroll viewport
    pub viewport_height: f32,
    pub layout: Layout,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Layout::default(), 1, DEFAULT_ZOOM_INDEX)
    }
}

/// Result of applying a command
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Transition {
    pub state: ViewState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &ViewState) -> Self {
        Self {
            state: state.clone(),
            effects: vec![],
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn new(layout: Layout, page_num: usize, zoom_index: usize) -> Self {
        let zoom_index = if zoom::zoom_level(zoom_index).is_some() {
            zoom_index
        } else {
            warn!("Zoom index {zoom_index} out of range, using default");
            DEFAULT_ZOOM_INDEX
        };

        Self {
            src: String::new(),
            page_num,
            zoom_index,
            phase: LoadPhase::Unloaded,
            generation: Generation::default(),
            page_count: 0,
            base_sizes: Vec::new(),
            window: None,
            scroll_offset: 0.0,
            viewport_height: 0.0,
            layout,
        }
    }

    /// Scale factor of the current zoom step
    #[must_use]
    pub fn scale(&self) -> f32 {
        zoom::scale_for(self.zoom_index)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.phase == LoadPhase::Loaded
    }

    /// Page heights at the current scale
    #[must_use]
    pub fn heights(&self) -> Vec<f32> {
        let scale = self.scale();
        self.base_sizes
            .iter()
            .map(|size| size.scaled(scale).height)
            .collect()
    }

    /// Page sizes at the current scale
    #[must_use]
    pub fn page_sizes(&self) -> Vec<Viewport> {
        let scale = self.scale();
        self.base_sizes.iter().map(|size| size.scaled(scale)).collect()
    }

    /// Scroll offset that brings `page` to the top
    #[must_use]
    pub fn offset_of(&self, page: usize) -> f32 {
        scroll_to_page(page, &self.heights(), self.layout.page_margin)
    }

    /// Page shown at `offset` for the last known viewport height
    #[must_use]
    pub fn page_at(&self, offset: f32) -> Option<usize> {
        infer_page_from_scroll(
            offset,
            self.viewport_height,
            &self.heights(),
            self.layout.page_margin,
        )
    }

    /// Apply a command and return the next state with its effects
    pub fn apply(&self, cmd: Command) -> Transition {
        match cmd {
            Command::SetSource(src) => self.set_source(src),
            Command::SetPageNum(page) => self.set_page_num(page),
            Command::SetZoomIndex(index) => self.set_zoom_index(index),
            Command::Scroll {
                offset,
                viewport_height,
            } => self.scroll(offset, viewport_height),
            Command::Settle => self.settle(),
            Command::DocumentOpened {
                generation,
                page_count,
            } => self.document_opened(generation, page_count),
            Command::PageLoaded {
                generation,
                page,
                base,
            } => self.page_loaded(generation, page, base),
            Command::LoadFailed { generation, reason } => self.load_failed(generation, reason),
        }
    }

    fn set_source(&self, src: String) -> Transition {
        let retry = matches!(self.phase, LoadPhase::Failed { .. });
        if src == self.src && !retry {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.src = src;
        next.generation = self.generation.next();
        next.page_count = 0;
        next.base_sizes.clear();
        next.window = None;
        next.scroll_offset = 0.0;

        let mut effects = vec![];
        let release = RenderPlan::between(self.window, None, false);
        if !release.is_empty() {
            effects.push(Effect::Render(release));
        }
        effects.push(Effect::DiscardDocument {
            generation: next.generation,
        });

        if next.src.is_empty() {
            next.phase = LoadPhase::Unloaded;
        } else {
            next.phase = LoadPhase::Loading;
            effects.push(Effect::OpenDocument {
                generation: next.generation,
                locator: next.src.clone(),
                scale: next.scale(),
            });
        }

        Transition {
            state: next,
            effects,
        }
    }

    fn set_page_num(&self, page: usize) -> Transition {
        if page == self.page_num {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.page_num = page;

        if !next.is_loaded() {
            return Transition {
                state: next,
                effects: vec![],
            };
        }

        next.scroll_offset = next.offset_of(page);
        let effects = vec![Effect::ScrollTo(next.scroll_offset), Effect::ScheduleSettle];
        Transition {
            state: next,
            effects,
        }
    }

    fn set_zoom_index(&self, index: usize) -> Transition {
        if zoom::zoom_level(index).is_none() {
            warn!("Ignoring zoom index {index} outside the zoom table");
            return Transition::unchanged(self);
        }
        if index == self.zoom_index {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.zoom_index = index;
        let mut effects = vec![Effect::Rescale {
            scale: next.scale(),
        }];

        if next.is_loaded() {
            next.scroll_offset = next.offset_of(next.page_num);
            effects.push(Effect::ScrollTo(next.scroll_offset));

            let window =
                RenderWindow::around(next.page_num, next.page_count, next.layout.window_radius);
            let plan = RenderPlan::between(self.window, window, true);
            next.window = window;
            if !plan.is_empty() {
                effects.push(Effect::Render(plan));
            }
        }

        Transition {
            state: next,
            effects,
        }
    }

    fn scroll(&self, offset: f32, viewport_height: f32) -> Transition {
        let mut next = self.clone();
        next.scroll_offset = offset;
        next.viewport_height = viewport_height;

        if !next.is_loaded() {
            return Transition {
                state: next,
                effects: vec![],
            };
        }

        let mut effects = vec![];
        if let Some(page) = next.page_at(offset) {
            if page != next.page_num {
                debug!("Scroll offset {offset} now shows page {page}");
                next.page_num = page;
                effects.push(Effect::RequestPageChange(PageChange {
                    page,
                    manual: false,
                }));
                effects.push(Effect::ScheduleSettle);
            }
        }

        Transition {
            state: next,
            effects,
        }
    }

    fn settle(&self) -> Transition {
        if !self.is_loaded() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        let window = RenderWindow::around(self.page_num, self.page_count, self.layout.window_radius);
        let plan = RenderPlan::between(self.window, window, false);
        next.window = window;

        let effects = if plan.is_empty() {
            vec![]
        } else {
            vec![Effect::Render(plan)]
        };
        Transition {
            state: next,
            effects,
        }
    }

    fn is_current_load(&self, generation: Generation) -> bool {
        let current = generation == self.generation && self.phase == LoadPhase::Loading;
        if !current {
            debug!(
                "Dropping result of load {generation:?} (current {:?}, {})",
                self.generation,
                self.phase.as_str()
            );
        }
        current
    }

    fn document_opened(&self, generation: Generation, page_count: usize) -> Transition {
        if !self.is_current_load(generation) {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.page_count = page_count;
        next.base_sizes = Vec::with_capacity(page_count);

        if page_count == 0 {
            return next.finish_load();
        }
        Transition {
            state: next,
            effects: vec![],
        }
    }

    fn page_loaded(&self, generation: Generation, page: usize, base: Viewport) -> Transition {
        if !self.is_current_load(generation) {
            return Transition::unchanged(self);
        }
        if page != self.base_sizes.len() + 1 || page > self.page_count {
            warn!(
                "Page {page} arrived out of order (have {} of {})",
                self.base_sizes.len(),
                self.page_count
            );
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.base_sizes.push(base);

        if next.base_sizes.len() == next.page_count {
            return next.finish_load();
        }
        Transition {
            state: next,
            effects: vec![],
        }
    }

    /// All pages are in: scroll to the current page and draw the first window
    fn finish_load(mut self) -> Transition {
        self.phase = LoadPhase::Loaded;
        self.scroll_offset = self.offset_of(self.page_num);

        let window = RenderWindow::around(self.page_num, self.page_count, self.layout.window_radius);
        let plan = RenderPlan::between(None, window, false);
        self.window = window;

        let mut effects = vec![Effect::ScrollTo(self.scroll_offset)];
        if !plan.is_empty() {
            effects.push(Effect::Render(plan));
        }
        Transition {
            state: self,
            effects,
        }
    }

    fn load_failed(&self, generation: Generation, reason: String) -> Transition {
        if !self.is_current_load(generation) {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.phase = LoadPhase::Failed { reason };
        next.page_count = 0;
        next.base_sizes.clear();
        next.window = None;

        Transition {
            state: next,
            effects: vec![Effect::DiscardDocument { generation }],
        }
    }
}

/// Inputs to the state machine
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Owner changed the `src` property
    SetSource(String),
    /// Owner changed the `page_num` property
    SetPageNum(usize),
    /// Owner changed the `zoom_index` property
    SetZoomIndex(usize),
    /// The page column scrolled
    Scroll { offset: f32, viewport_height: f32 },
    /// Scrolling has been quiet for the settle delay
    Settle,
    /// Loader opened the document
    DocumentOpened {
        generation: Generation,
        page_count: usize,
    },
    /// Loader constructed page `page` (1-based)
    PageLoaded {
        generation: Generation,
        page: usize,
        base: Viewport,
    },
    /// Loader gave up
    LoadFailed {
        generation: Generation,
        reason: String,
    },
}

/// Work the component carries out after a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Drop the document and page sequence; loads older than `generation` are stale
    DiscardDocument { generation: Generation },
    /// Start loading a document
    OpenDocument {
        generation: Generation,
        locator: String,
        scale: f32,
    },
    /// Reset and draw page views
    Render(RenderPlan),
    /// Update every page view to a new scale
    Rescale { scale: f32 },
    /// Move the page column to this offset
    ScrollTo(f32),
    /// (Re)arm the settle debounce
    ScheduleSettle,
    /// Ask the owner to change the page
    RequestPageChange(PageChange),
}
