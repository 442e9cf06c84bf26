use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pageview::ViewerConfig;
use pageview::test_utils::test_helpers::*;
use pageview::viewer::synthetic::{LETTER, SyntheticDocument, SyntheticEngine, ViewOp};
use pageview::viewer::{Interaction, LoadPhase, PageChange, Viewport};

fn pages(range: std::ops::RangeInclusive<usize>) -> BTreeSet<usize> {
    range.collect()
}

fn record_page_changes(viewer: &mut pageview::DocumentViewer) -> Rc<RefCell<Vec<PageChange>>> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    viewer.on_page_change(move |change| sink.borrow_mut().push(change));
    changes
}

fn record_zoom_changes(viewer: &mut pageview::DocumentViewer) -> Rc<RefCell<Vec<usize>>> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    viewer.on_zoom_change(move |index| sink.borrow_mut().push(index));
    changes
}

#[test]
fn loading_draws_window_around_current_page() {
    let (mut viewer, journal) = viewer_for(uniform_engine("doc.pdf", 20));
    viewer.set_page_num(10);
    viewer.set_src("doc.pdf");
    assert_eq!(viewer.phase(), &LoadPhase::Loading);

    assert!(wait_for_load(&mut viewer));
    assert_eq!(viewer.phase(), &LoadPhase::Loaded);
    assert_eq!(viewer.page_count(), 20);
    assert_eq!(viewer.loaded_pages(), 20);
    assert!(viewer.document().is_some());
    assert_eq!(journal.drawn_pages("doc.pdf"), pages(5..=15));
    assert_eq!(viewer.take_scroll_request(), Some(9.0 * (LETTER.height + 20.0)));
}

#[test]
fn oversized_radius_still_draws_eleven_pages() {
    let config = ViewerConfig {
        window_radius: 20,
        ..ViewerConfig::default()
    };
    let (mut viewer, journal) = viewer_with_config(uniform_engine("doc.pdf", 100), &config);
    viewer.set_page_num(50);
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));

    assert_eq!(journal.drawn_pages("doc.pdf"), pages(45..=55));
}

#[test]
fn scrolling_to_top_moves_window_after_settle() {
    let (mut viewer, journal) = viewer_for(uniform_engine("doc.pdf", 20));
    let changes = record_page_changes(&mut viewer);
    viewer.set_page_num(10);
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));

    viewer.handle(Interaction::Scroll {
        offset: 0.0,
        viewport_height: 600.0,
    });
    assert_eq!(viewer.page_num(), 1);
    assert_eq!(
        changes.borrow().as_slice(),
        &[PageChange {
            page: 1,
            manual: false
        }]
    );
    assert!(viewer.settle_pending());
    let remaining = viewer.settle_remaining(Instant::now());
    assert!(remaining.is_some_and(|left| left <= Duration::from_millis(1000)));

    // Nothing moves before the debounce interval
    viewer.tick(Instant::now());
    assert_eq!(journal.drawn_pages("doc.pdf"), pages(5..=15));

    viewer.tick(Instant::now() + Duration::from_millis(1001));
    assert_eq!(journal.drawn_pages("doc.pdf"), pages(1..=6));
    assert!(!viewer.settle_pending());
    assert_eq!(viewer.settle_remaining(Instant::now()), None);
}

#[test]
fn burst_of_scrolls_renders_once() {
    let (mut viewer, journal) = viewer_for(uniform_engine("doc.pdf", 40));
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));
    journal.clear();

    let page_extent = LETTER.height + 20.0;
    for page in 2..=30 {
        viewer.handle(Interaction::Scroll {
            offset: (page - 1) as f32 * page_extent,
            viewport_height: 600.0,
        });
    }
    assert_eq!(viewer.page_num(), 30);
    assert!(journal.events().is_empty(), "no drawing while scrolling");

    viewer.tick(Instant::now() + Duration::from_secs(2));
    assert_eq!(journal.drawn_pages("doc.pdf"), pages(25..=35));
    let draws = journal
        .events()
        .iter()
        .filter(|e| e.op == ViewOp::Draw)
        .count();
    assert_eq!(draws, 11);
}

#[test]
fn zoom_change_keeps_page_and_rescales_every_view() {
    let (mut viewer, journal) = viewer_for(uniform_engine("doc.pdf", 12));
    viewer.set_page_num(7);
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));

    for index in 0..=6 {
        viewer.set_zoom_index(index);
        assert_eq!(viewer.page_num(), 7);
    }

    let scales = journal.last_scales("doc.pdf");
    assert_eq!(scales.len(), 12);
    assert!(scales.values().all(|&scale| scale == 2.0));
    assert_eq!(
        viewer.take_scroll_request(),
        Some(6.0 * (LETTER.height * 2.0 + 20.0))
    );
}

#[test]
fn zoom_during_load_applies_to_late_pages() {
    let engine = SyntheticEngine::default().with_document(
        "slow.pdf",
        SyntheticDocument::uniform(6, LETTER).with_fetch_delay(Duration::from_millis(5)),
    );
    let (mut viewer, journal) = viewer_for(engine);
    viewer.set_src("slow.pdf");
    viewer.set_zoom_index(5);
    assert!(wait_for_load(&mut viewer));

    let scales = journal.last_scales("slow.pdf");
    assert_eq!(scales.len(), 6);
    assert!(scales.values().all(|&scale| scale == 1.75));
}

#[test]
fn round_trip_scroll_for_every_page() {
    let sizes: Vec<Viewport> = (0..25)
        .map(|i| {
            if i % 3 == 0 {
                Viewport::new(LETTER.height, LETTER.width)
            } else {
                LETTER
            }
        })
        .collect();
    let engine =
        SyntheticEngine::default().with_document("mixed.pdf", SyntheticDocument::with_pages(sizes));
    let (mut viewer, _) = viewer_for(engine);
    viewer.set_src("mixed.pdf");
    assert!(wait_for_load(&mut viewer));

    for zoom in [0, 2, 6] {
        viewer.set_zoom_index(zoom);
        for page in 1..=25 {
            let offset = viewer.state().offset_of(page);
            viewer.handle(Interaction::Scroll {
                offset,
                viewport_height: 700.0,
            });
            assert_eq!(viewer.page_num(), page, "zoom {zoom}");
        }
    }
}

#[test]
fn open_failure_is_reported() {
    let engine = SyntheticEngine::default()
        .with_document("bad.pdf", SyntheticDocument::failing_open("not a PDF file"));
    let (mut viewer, _) = viewer_for(engine);
    viewer.set_src("bad.pdf");
    assert!(wait_for_load(&mut viewer));

    assert_eq!(
        viewer.phase(),
        &LoadPhase::Failed {
            reason: "cannot open bad.pdf: not a PDF file".into()
        }
    );
    let toolbar = viewer.toolbar();
    assert!(!toolbar.page_up_enabled && !toolbar.page_down_enabled);
    assert_eq!(
        toolbar.status.as_deref(),
        Some("Failed: cannot open bad.pdf: not a PDF file")
    );
}

#[test]
fn malformed_document_is_reported() {
    let engine = SyntheticEngine::default()
        .with_document("empty.pdf", SyntheticDocument::malformed("no xref table"));
    let (mut viewer, _) = viewer_for(engine);
    viewer.set_src("empty.pdf");
    assert!(wait_for_load(&mut viewer));

    assert_eq!(
        viewer.phase(),
        &LoadPhase::Failed {
            reason: "malformed document: no xref table".into()
        }
    );
}

#[test]
fn page_fetch_failure_drops_partial_pages() {
    let engine = SyntheticEngine::default()
        .with_document("torn.pdf", SyntheticDocument::uniform(10, LETTER).failing_at(4));
    let (mut viewer, journal) = viewer_for(engine);
    viewer.set_src("torn.pdf");
    assert!(wait_for_load(&mut viewer));

    assert!(matches!(viewer.phase(), LoadPhase::Failed { .. }));
    assert_eq!(viewer.loaded_pages(), 0);
    assert_eq!(viewer.page_count(), 0);
    assert!(viewer.document().is_none());
    assert!(journal.drawn_pages("torn.pdf").is_empty());
}

#[test]
fn superseded_load_never_reaches_the_viewer() {
    let engine = SyntheticEngine::default()
        .with_document(
            "slow.pdf",
            SyntheticDocument::uniform(50, LETTER).with_fetch_delay(Duration::from_millis(10)),
        )
        .with_document("fast.pdf", SyntheticDocument::uniform(3, LETTER));
    let (mut viewer, journal) = viewer_for(engine);

    viewer.set_src("slow.pdf");
    viewer.tick(Instant::now());
    viewer.set_src("fast.pdf");
    assert!(wait_for_load(&mut viewer));

    // Let any straggling slow.pdf responses arrive
    std::thread::sleep(Duration::from_millis(50));
    viewer.tick(Instant::now());

    assert_eq!(viewer.src(), "fast.pdf");
    assert_eq!(viewer.page_count(), 3);
    assert_eq!(viewer.loaded_pages(), 3);
    assert!(journal.drawn_pages("slow.pdf").is_empty());
    assert_eq!(journal.drawn_pages("fast.pdf"), pages(1..=3));
}

#[test]
fn changing_source_releases_drawn_pages() {
    let engine = uniform_engine("a.pdf", 4).with_document("b.pdf", SyntheticDocument::uniform(2, LETTER));
    let (mut viewer, journal) = viewer_for(engine);
    viewer.set_src("a.pdf");
    assert!(wait_for_load(&mut viewer));
    assert_eq!(journal.drawn_pages("a.pdf"), pages(1..=4));

    viewer.set_src("b.pdf");
    assert!(journal.drawn_pages("a.pdf").is_empty());
    assert_eq!(viewer.loaded_pages(), 0);
    assert!(wait_for_load(&mut viewer));
    assert_eq!(journal.drawn_pages("b.pdf"), pages(1..=2));

    viewer.set_src("");
    assert_eq!(viewer.phase(), &LoadPhase::Unloaded);
    assert!(journal.drawn_pages("b.pdf").is_empty());
}

#[test]
fn toolbar_interactions_request_changes() {
    let (mut viewer, _) = viewer_for(uniform_engine("doc.pdf", 5));
    let pages_requested = record_page_changes(&mut viewer);
    let zooms_requested = record_zoom_changes(&mut viewer);
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));

    viewer.handle(Interaction::PageUp);
    viewer.handle(Interaction::PageDown);
    viewer.handle(Interaction::GoToPage("42".into()));
    viewer.handle(Interaction::Magnify);
    viewer.handle(Interaction::Minify);
    viewer.handle(Interaction::SelectZoom(0));

    assert_eq!(
        pages_requested.borrow().as_slice(),
        &[
            PageChange {
                page: 2,
                manual: true
            },
            PageChange {
                page: 5,
                manual: true
            },
        ]
    );
    assert_eq!(zooms_requested.borrow().as_slice(), &[3, 1, 0]);

    // Requests alone never change the properties
    assert_eq!(viewer.page_num(), 1);
    assert_eq!(viewer.zoom_index(), 2);
}

#[test]
fn explicit_page_change_scrolls_and_settles() {
    let (mut viewer, journal) = viewer_for(uniform_engine("doc.pdf", 30));
    viewer.set_src("doc.pdf");
    assert!(wait_for_load(&mut viewer));
    viewer.take_scroll_request();

    viewer.set_page_num(20);
    assert_eq!(
        viewer.take_scroll_request(),
        Some(19.0 * (LETTER.height + 20.0))
    );
    viewer.tick(Instant::now() + Duration::from_millis(1500));
    assert_eq!(journal.drawn_pages("doc.pdf"), pages(15..=25));

    let toolbar = viewer.toolbar();
    assert_eq!(toolbar.page_input, 20);
    assert_eq!(toolbar.page_count_label, "of 30");
}
