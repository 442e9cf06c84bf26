pub mod config;
pub mod event_source;
pub mod host;
pub mod panic_handler;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ViewerConfig;
pub use host::{HostApp, run_host_with_event_source};
pub use viewer::{DocumentViewer, Interaction, LoadPhase, PageChange};
