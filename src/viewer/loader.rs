//! Page loader - opens documents and fetches pages on a worker thread

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::engine::DocumentEngine;
use super::request::{LoadRequest, LoadResponse, LoadedPage};
use super::types::Generation;

/// Handle to the loader worker owned by one viewer
pub struct PageLoader {
    request_tx: Sender<LoadRequest>,
    response_rx: Receiver<LoadResponse>,
    /// Most recent generation handed out; older loads stop between pages
    latest: Arc<AtomicU64>,
}

impl PageLoader {
    /// Spawn the worker thread for `engine`
    #[must_use]
    pub fn spawn(engine: Arc<dyn DocumentEngine>) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        let latest = Arc::new(AtomicU64::new(0));

        let worker_latest = latest.clone();
        std::thread::spawn(move || {
            load_worker(engine.as_ref(), &request_rx, &response_tx, &worker_latest);
        });

        Self {
            request_tx,
            response_rx,
            latest,
        }
    }

    /// Start loading `locator` as `generation`, superseding any earlier load
    pub fn load(&self, generation: Generation, locator: &str, scale: f32) {
        self.supersede(generation);
        let _ = self.request_tx.send(LoadRequest::Open {
            generation,
            locator: locator.to_string(),
            scale,
        });
    }

    /// Mark every load older than `generation` as stale
    pub fn supersede(&self, generation: Generation) {
        self.latest.store(generation.0, Ordering::Release);
    }

    /// Drain finished work without blocking
    pub fn poll_responses(&self) -> Vec<LoadResponse> {
        self.response_rx.try_iter().collect()
    }

    /// Get the response receiver for blocking usage
    #[must_use]
    pub fn response_receiver(&self) -> &Receiver<LoadResponse> {
        &self.response_rx
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(LoadRequest::Shutdown);
    }
}

impl Drop for PageLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn is_superseded(latest: &AtomicU64, generation: Generation) -> bool {
    latest.load(Ordering::Acquire) != generation.0
}

fn load_worker(
    engine: &dyn DocumentEngine,
    requests: &Receiver<LoadRequest>,
    responses: &Sender<LoadResponse>,
    latest: &AtomicU64,
) {
    while let Ok(request) = requests.recv() {
        match request {
            LoadRequest::Shutdown => break,
            LoadRequest::Open {
                generation,
                locator,
                scale,
            } => {
                if !load_document(engine, &locator, generation, scale, responses, latest) {
                    break;
                }
            }
        }
    }
    debug!("Loader worker exiting");
}

/// Returns false once the response channel is gone
fn load_document(
    engine: &dyn DocumentEngine,
    locator: &str,
    generation: Generation,
    scale: f32,
    responses: &Sender<LoadResponse>,
    latest: &AtomicU64,
) -> bool {
    if is_superseded(latest, generation) {
        debug!("Skipping superseded load {generation:?} of {locator}");
        return responses.send(LoadResponse::Cancelled(generation)).is_ok();
    }

    let document = match engine.open_document(locator) {
        Ok(document) => document,
        Err(error) => {
            warn!("Failed to open {locator}: {error}");
            return responses
                .send(LoadResponse::Failed { generation, error })
                .is_ok();
        }
    };

    let page_count = document.page_count();
    debug!("Opened {locator} ({page_count} pages) as {generation:?}");
    let opened = LoadResponse::Opened {
        generation,
        document: document.clone(),
        page_count,
    };
    if responses.send(opened).is_err() {
        return false;
    }

    for page in 1..=page_count {
        if is_superseded(latest, generation) {
            debug!("Load {generation:?} superseded after {} pages", page - 1);
            return responses.send(LoadResponse::Cancelled(generation)).is_ok();
        }

        let response = match document.get_page(page) {
            Ok(handle) => {
                let base = handle.compute_viewport(1.0);
                let view = handle.create_view(scale);
                LoadResponse::Page {
                    generation,
                    page,
                    loaded: LoadedPage {
                        page: handle,
                        view,
                        base,
                    },
                }
            }
            Err(error) => {
                warn!("Failed to fetch page {page} of {locator}: {error}");
                return responses
                    .send(LoadResponse::Failed { generation, error })
                    .is_ok();
            }
        };

        if responses.send(response).is_err() {
            return false;
        }
    }

    true
}
