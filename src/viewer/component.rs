//! Document viewer component
//!
//! Owns the view state, the document handle and the page sequence, and
//! carries out the effects of every state transition: talking to the
//! loader, drawing and releasing page views, moving the scroll position and
//! notifying the owner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use super::debounce::Debouncer;
use super::engine::{DocumentEngine, DocumentHandle, PageHandle, PageView};
use super::handlers::{Interaction, Request, request_for};
use super::loader::PageLoader;
use super::request::LoadResponse;
use super::state::{Command, Effect, LoadPhase, ViewState};
use super::toolbar::ToolbarModel;
use super::types::{Generation, PageChange, Viewport};
use super::window::RenderPlan;
use crate::config::ViewerConfig;

/// One page of the loaded document
pub struct PageEntry {
    pub page: Box<dyn PageHandle>,
    pub view: Box<dyn PageView>,
    /// Page size at scale 1.0
    pub base: Viewport,
}

type PageChangeCallback = Box<dyn FnMut(PageChange)>;
type ZoomChangeCallback = Box<dyn FnMut(usize)>;

/// Embeddable paged-document viewer
pub struct DocumentViewer {
    state: ViewState,
    loader: PageLoader,
    document: Option<Arc<dyn DocumentHandle>>,
    pages: Vec<PageEntry>,
    /// Scale the loader creates page views at for the current load
    load_scale: f32,
    settle: Debouncer,
    /// Scroll position the host should apply, set by the viewer
    pending_scroll: Option<f32>,
    on_page_change: Option<PageChangeCallback>,
    on_zoom_change: Option<ZoomChangeCallback>,
}

impl DocumentViewer {
    /// Create a viewer with its own loader worker for `engine`
    #[must_use]
    pub fn new(engine: Arc<dyn DocumentEngine>, config: &ViewerConfig) -> Self {
        let state = ViewState::new(config.layout(), 1, config.initial_zoom_index);
        let load_scale = state.scale();

        Self {
            state,
            loader: PageLoader::spawn(engine),
            document: None,
            pages: Vec::new(),
            load_scale,
            settle: Debouncer::new(config.settle_delay()),
            pending_scroll: None,
            on_page_change: None,
            on_zoom_change: None,
        }
    }

    /// Called with every page change the viewer requests
    pub fn on_page_change(&mut self, callback: impl FnMut(PageChange) + 'static) {
        self.on_page_change = Some(Box::new(callback));
    }

    /// Called with every zoom change the viewer requests
    pub fn on_zoom_change(&mut self, callback: impl FnMut(usize) + 'static) {
        self.on_zoom_change = Some(Box::new(callback));
    }

    // Properties

    pub fn set_src(&mut self, src: impl Into<String>) {
        self.apply_command(Command::SetSource(src.into()));
    }

    pub fn set_page_num(&mut self, page: usize) {
        self.apply_command(Command::SetPageNum(page));
    }

    pub fn set_zoom_index(&mut self, index: usize) {
        self.apply_command(Command::SetZoomIndex(index));
    }

    #[must_use]
    pub fn src(&self) -> &str {
        &self.state.src
    }

    #[must_use]
    pub fn page_num(&self) -> usize {
        self.state.page_num
    }

    #[must_use]
    pub fn zoom_index(&self) -> usize {
        self.state.zoom_index
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> &LoadPhase {
        &self.state.phase
    }

    #[must_use]
    pub fn toolbar(&self) -> ToolbarModel {
        ToolbarModel::from_state(&self.state)
    }

    #[must_use]
    pub fn document(&self) -> Option<&Arc<dyn DocumentHandle>> {
        self.document.as_ref()
    }

    /// Number of page entries constructed so far
    #[must_use]
    pub fn loaded_pages(&self) -> usize {
        self.pages.len()
    }

    /// Scroll offset the viewer last moved to or was told about
    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.state.scroll_offset
    }

    /// Scroll position the host has to apply to its scroll container
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        self.pending_scroll.take()
    }

    #[must_use]
    pub fn settle_pending(&self) -> bool {
        self.settle.is_pending()
    }

    /// Time until the pending settle fires
    #[must_use]
    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        self.settle.remaining(now)
    }

    /// Handle a user interaction
    pub fn handle(&mut self, interaction: Interaction) {
        if let Interaction::Scroll {
            offset,
            viewport_height,
        } = interaction
        {
            self.apply_command(Command::Scroll {
                offset,
                viewport_height,
            });
            return;
        }

        match request_for(&self.state, &interaction) {
            Some(Request::Page(change)) => self.request_page_change(change),
            Some(Request::Zoom(index)) => self.request_zoom_change(index),
            None => debug!("Interaction {interaction:?} produced no request"),
        }
    }

    /// Drive the viewer: pick up loader results and fire the settle timer.
    ///
    /// Returns true when anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for response in self.loader.poll_responses() {
            self.handle_load_response(response);
            changed = true;
        }

        if self.settle.poll(now) {
            self.apply_command(Command::Settle);
            changed = true;
        }

        changed
    }

    /// Feed one loader result into the viewer
    pub fn handle_load_response(&mut self, response: LoadResponse) {
        let generation = response.generation();
        if generation != self.state.generation {
            debug!(
                "Discarding {response:?} from superseded load (current {:?})",
                self.state.generation
            );
            return;
        }

        match response {
            LoadResponse::Opened {
                generation,
                document,
                page_count,
            } => {
                self.document = Some(document);
                self.pages = Vec::with_capacity(page_count);
                self.apply_command(Command::DocumentOpened {
                    generation,
                    page_count,
                });
            }
            LoadResponse::Page {
                generation,
                page,
                loaded,
            } => {
                if self.state.phase != LoadPhase::Loading || page != self.pages.len() + 1 {
                    debug!("Page {page} does not extend the sequence, dropping");
                    return;
                }
                let mut entry = PageEntry {
                    page: loaded.page,
                    view: loaded.view,
                    base: loaded.base,
                };
                let scale = self.state.scale();
                if (scale - self.load_scale).abs() > f32::EPSILON {
                    entry.view.update(scale, 0);
                }
                self.pages.push(entry);
                self.apply_command(Command::PageLoaded {
                    generation,
                    page,
                    base: loaded.base,
                });
            }
            LoadResponse::Cancelled(generation) => {
                debug!("Load {generation:?} cancelled");
            }
            LoadResponse::Failed { generation, error } => {
                error!("Loading {} failed: {error}", self.state.src);
                self.apply_command(Command::LoadFailed {
                    generation,
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Apply a command and carry out its effects
    pub fn apply_command(&mut self, cmd: Command) {
        let transition = self.state.apply(cmd);
        self.state = transition.state;
        self.execute_effects(transition.effects);
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DiscardDocument { generation } => self.discard_document(generation),

                Effect::OpenDocument {
                    generation,
                    locator,
                    scale,
                } => {
                    info!("Loading {locator} as {generation:?}");
                    self.load_scale = scale;
                    self.loader.load(generation, &locator, scale);
                }

                Effect::Render(plan) => self.render(&plan),

                Effect::Rescale { scale } => {
                    debug!("Rescaling {} pages to {scale}", self.pages.len());
                    for entry in &mut self.pages {
                        entry.view.update(scale, 0);
                    }
                }

                Effect::ScrollTo(offset) => {
                    self.pending_scroll = Some(offset);
                }

                Effect::ScheduleSettle => self.settle.trigger(),

                Effect::RequestPageChange(change) => self.request_page_change(change),
            }
        }
    }

    fn discard_document(&mut self, generation: Generation) {
        self.loader.supersede(generation);
        self.settle.cancel();
        self.pending_scroll = None;
        if self.document.take().is_some() {
            debug!("Dropped document and {} pages", self.pages.len());
        }
        self.pages.clear();
    }

    fn render(&mut self, plan: &RenderPlan) {
        debug!("Render pass: release {:?}, draw {:?}", plan.release, plan.draw);

        for &page in &plan.release {
            if let Some(entry) = self.pages.get_mut(page - 1) {
                entry.view.reset();
            }
        }
        for &page in &plan.draw {
            if let Some(entry) = self.pages.get_mut(page - 1) {
                entry.view.draw();
            }
        }
    }

    fn request_page_change(&mut self, change: PageChange) {
        debug!("Requesting page {} (manual: {})", change.page, change.manual);
        if let Some(callback) = self.on_page_change.as_mut() {
            callback(change);
        }
    }

    fn request_zoom_change(&mut self, index: usize) {
        debug!("Requesting zoom index {index}");
        if let Some(callback) = self.on_zoom_change.as_mut() {
            callback(index);
        }
    }
}
