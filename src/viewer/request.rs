//! Loader request and response types

use std::sync::Arc;

use super::engine::{DocumentHandle, EngineError, PageHandle, PageView};
use super::types::{Generation, Viewport};

/// Request sent to the loader worker
#[derive(Debug)]
pub enum LoadRequest {
    /// Open `locator` and fetch all of its pages
    Open {
        generation: Generation,
        locator: String,
        /// Scale the page views are created at
        scale: f32,
    },

    /// Shutdown the worker
    Shutdown,
}

/// A fetched page ready to be placed in the page sequence
pub struct LoadedPage {
    pub page: Box<dyn PageHandle>,
    pub view: Box<dyn PageView>,
    /// Page size at scale 1.0
    pub base: Viewport,
}

impl std::fmt::Debug for LoadedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPage")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Response from the loader worker
pub enum LoadResponse {
    /// Document opened
    Opened {
        generation: Generation,
        document: Arc<dyn DocumentHandle>,
        page_count: usize,
    },

    /// One page fetched; `page` is 1-based
    Page {
        generation: Generation,
        page: usize,
        loaded: LoadedPage,
    },

    /// The load was superseded by a newer generation before it finished
    Cancelled(Generation),

    /// Open or page fetch failed
    Failed {
        generation: Generation,
        error: EngineError,
    },
}

impl LoadResponse {
    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Opened { generation, .. }
            | Self::Page { generation, .. }
            | Self::Failed { generation, .. } => *generation,
            Self::Cancelled(generation) => *generation,
        }
    }
}

impl std::fmt::Debug for LoadResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opened {
                generation,
                page_count,
                ..
            } => f
                .debug_struct("Opened")
                .field("generation", generation)
                .field("page_count", page_count)
                .finish_non_exhaustive(),
            Self::Page {
                generation,
                page,
                loaded,
            } => f
                .debug_struct("Page")
                .field("generation", generation)
                .field("page", page)
                .field("loaded", loaded)
                .finish(),
            Self::Cancelled(generation) => f.debug_tuple("Cancelled").field(generation).finish(),
            Self::Failed { generation, error } => f
                .debug_struct("Failed")
                .field("generation", generation)
                .field("error", error)
                .finish(),
        }
    }
}
