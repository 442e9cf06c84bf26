//! Paged document viewer
//!
//! The pure parts (state machine, scroll mapping, render window, zoom table,
//! toolbar model) are plain functions over values. [`DocumentViewer`] wires
//! them to a [`DocumentEngine`] through the page loader.

mod component;
mod debounce;
mod engine;
mod handlers;
mod loader;
mod request;
mod scroll;
mod state;
pub mod synthetic;
mod toolbar;
mod types;
mod window;
mod zoom;

pub use component::{DocumentViewer, PageEntry};
pub use debounce::{Debouncer, SETTLE_DELAY};
pub use engine::{
    DocumentEngine, DocumentHandle, EngineError, EngineOptions, PageHandle, PageView,
};
pub use handlers::{Interaction, Request, can_page_down, can_page_up, request_for};
pub use loader::PageLoader;
pub use request::{LoadRequest, LoadResponse, LoadedPage};
pub use scroll::{PAGE_MARGIN, infer_page_from_scroll, scroll_to_page, total_height};
pub use state::{Command, Effect, Layout, LoadPhase, Transition, ViewState};
pub use toolbar::{ToolbarModel, ZoomOption};
pub use types::*;
pub use window::{RenderPlan, RenderWindow, WINDOW_RADIUS};
pub use zoom::*;
