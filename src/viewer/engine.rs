//! Document engine seam
//!
//! Parsing and rasterization live behind these traits. The viewer only
//! opens documents, fetches pages, asks for their size at a scale, and
//! drives per-page views.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::Viewport;

/// Options handed to an engine when the host constructs it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Location of the engine's background worker script or binary, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_src: Option<String>,
}

/// Errors reported by a document engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("cannot open {locator}: {reason}")]
    Open { locator: String, reason: String },

    #[error("cannot fetch page {page}: {reason}")]
    PageFetch { page: usize, reason: String },

    #[error("malformed document: {0}")]
    Malformed(String),
}

impl EngineError {
    pub fn open(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Open {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    pub fn page_fetch(page: usize, reason: impl Into<String>) -> Self {
        Self::PageFetch {
            page,
            reason: reason.into(),
        }
    }
}

/// Opens documents. Called from the loader thread.
pub trait DocumentEngine: Send + Sync {
    fn open_document(&self, locator: &str) -> Result<Arc<dyn DocumentHandle>, EngineError>;
}

/// An opened document
pub trait DocumentHandle: Send + Sync {
    fn page_count(&self) -> usize;

    /// Fetch page `page` (1-based)
    fn get_page(&self, page: usize) -> Result<Box<dyn PageHandle>, EngineError>;
}

/// One page of an opened document
pub trait PageHandle: Send {
    /// Page size at `scale`
    fn compute_viewport(&self, scale: f32) -> Viewport;

    /// Drawable view of this page bound to its rendering surface
    fn create_view(&self, scale: f32) -> Box<dyn PageView>;
}

/// Drawable wrapper around one page
pub trait PageView: Send {
    fn draw(&mut self);

    /// Drop rendered content and free its resources
    fn reset(&mut self);

    fn update(&mut self, scale: f32, rotation: u16);
}
