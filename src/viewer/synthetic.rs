//! In-memory document engine
//!
//! Serves documents made of blank pages with known sizes. Used by the
//! terminal host for demos and by tests, where the journal of view
//! operations shows exactly which pages were drawn and released.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;

use super::engine::{
    DocumentEngine, DocumentHandle, EngineError, EngineOptions, PageHandle, PageView,
};
use super::types::Viewport;

/// US Letter at 72 dpi
pub const LETTER: Viewport = Viewport::new(612.0, 792.0);

/// Description of a document served by [`SyntheticEngine`]
#[derive(Clone, Debug, Default)]
pub struct SyntheticDocument {
    /// Page sizes at scale 1.0
    pub pages: Vec<Viewport>,
    /// Opening fails with this reason
    pub open_error: Option<String>,
    /// Opening finds the content unreadable
    pub malformed: Option<String>,
    /// Fetching this page (1-based) fails
    pub failing_page: Option<usize>,
    /// Delay before each page fetch completes
    pub fetch_delay: Duration,
}

impl SyntheticDocument {
    /// `count` pages of the same size
    #[must_use]
    pub fn uniform(count: usize, size: Viewport) -> Self {
        Self {
            pages: vec![size; count],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pages(pages: Vec<Viewport>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_open(reason: impl Into<String>) -> Self {
        Self {
            open_error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Document whose bytes the engine cannot make sense of
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            malformed: Some(reason.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_at(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }

    #[must_use]
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }
}

/// Operation performed on a page view
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewOp {
    Draw,
    Reset,
    Update { scale: f32, rotation: u16 },
}

/// One journal line: which document and page, and what happened to its view
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEvent {
    pub locator: String,
    pub page: usize,
    pub op: ViewOp,
}

/// Shared record of every view operation
#[derive(Clone, Debug, Default)]
pub struct ViewJournal {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl ViewJournal {
    fn record(&self, locator: &str, page: usize, op: ViewOp) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ViewEvent {
                locator: locator.to_string(),
                page,
                op,
            });
    }

    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Pages of `locator` whose last draw has not been followed by a reset
    #[must_use]
    pub fn drawn_pages(&self, locator: &str) -> BTreeSet<usize> {
        let mut drawn = BTreeSet::new();
        for event in self.events().iter().filter(|e| e.locator == locator) {
            match event.op {
                ViewOp::Draw => {
                    drawn.insert(event.page);
                }
                ViewOp::Reset => {
                    drawn.remove(&event.page);
                }
                ViewOp::Update { .. } => {}
            }
        }
        drawn
    }

    /// Last scale each page of `locator` was updated to
    #[must_use]
    pub fn last_scales(&self, locator: &str) -> HashMap<usize, f32> {
        self.events()
            .iter()
            .filter(|e| e.locator == locator)
            .filter_map(|e| match e.op {
                ViewOp::Update { scale, .. } => Some((e.page, scale)),
                _ => None,
            })
            .collect()
    }
}

/// Document engine backed by [`SyntheticDocument`] descriptions
#[derive(Debug, Default)]
pub struct SyntheticEngine {
    options: EngineOptions,
    documents: HashMap<String, SyntheticDocument>,
    journal: ViewJournal,
}

impl SyntheticEngine {
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Serve `document` under `locator`
    #[must_use]
    pub fn with_document(mut self, locator: impl Into<String>, document: SyntheticDocument) -> Self {
        self.documents.insert(locator.into(), document);
        self
    }

    #[must_use]
    pub fn journal(&self) -> ViewJournal {
        self.journal.clone()
    }
}

impl DocumentEngine for SyntheticEngine {
    fn open_document(&self, locator: &str) -> Result<Arc<dyn DocumentHandle>, EngineError> {
        let document = self
            .documents
            .get(locator)
            .ok_or_else(|| EngineError::open(locator, "no such document"))?;

        if let Some(reason) = &document.open_error {
            return Err(EngineError::open(locator, reason.clone()));
        }
        if let Some(reason) = &document.malformed {
            return Err(EngineError::Malformed(reason.clone()));
        }

        debug!(
            "Synthetic engine opened {locator} (worker: {:?})",
            self.options.worker_src
        );
        Ok(Arc::new(SyntheticHandle {
            locator: locator.to_string(),
            document: document.clone(),
            journal: self.journal.clone(),
        }))
    }
}

struct SyntheticHandle {
    locator: String,
    document: SyntheticDocument,
    journal: ViewJournal,
}

impl DocumentHandle for SyntheticHandle {
    fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    fn get_page(&self, page: usize) -> Result<Box<dyn PageHandle>, EngineError> {
        if !self.document.fetch_delay.is_zero() {
            std::thread::sleep(self.document.fetch_delay);
        }

        if self.document.failing_page == Some(page) {
            return Err(EngineError::page_fetch(page, "corrupt page object"));
        }

        let size = page
            .checked_sub(1)
            .and_then(|index| self.document.pages.get(index))
            .copied()
            .ok_or_else(|| EngineError::page_fetch(page, "page out of range"))?;

        Ok(Box::new(SyntheticPage {
            locator: self.locator.clone(),
            page,
            size,
            journal: self.journal.clone(),
        }))
    }
}

struct SyntheticPage {
    locator: String,
    page: usize,
    size: Viewport,
    journal: ViewJournal,
}

impl PageHandle for SyntheticPage {
    fn compute_viewport(&self, scale: f32) -> Viewport {
        self.size.scaled(scale)
    }

    fn create_view(&self, _scale: f32) -> Box<dyn PageView> {
        Box::new(SyntheticView {
            locator: self.locator.clone(),
            page: self.page,
            journal: self.journal.clone(),
        })
    }
}

struct SyntheticView {
    locator: String,
    page: usize,
    journal: ViewJournal,
}

impl PageView for SyntheticView {
    fn draw(&mut self) {
        self.journal.record(&self.locator, self.page, ViewOp::Draw);
    }

    fn reset(&mut self) {
        self.journal.record(&self.locator, self.page, ViewOp::Reset);
    }

    fn update(&mut self, scale: f32, rotation: u16) {
        self.journal
            .record(&self.locator, self.page, ViewOp::Update { scale, rotation });
    }
}
