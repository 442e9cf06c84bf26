use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use pageview::config;
use pageview::event_source::KeyboardEventSource;
use pageview::panic_handler;
use pageview::viewer::synthetic::{LETTER, SyntheticDocument, SyntheticEngine};
use pageview::viewer::{DocumentViewer, Viewport};
use pageview::{HostApp, run_host_with_event_source};

/// Terminal host for the pageview document viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Document locator to open
    #[arg(default_value = "demo.pdf")]
    src: String,

    /// Number of pages in the demo document
    #[arg(long, default_value_t = 20)]
    pages: usize,

    /// Page to start on (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Zoom index (0 = 50% .. 6 = 200%), overrides the config
    #[arg(long)]
    zoom: Option<usize>,

    /// Make fetching this page fail
    #[arg(long)]
    fail_at: Option<usize>,

    /// Mix portrait and landscape pages
    #[arg(long)]
    mixed: bool,

    /// Serve the document as unreadable
    #[arg(long)]
    malformed: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file
    #[arg(long, default_value = "pageview.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

fn demo_document(args: &Args) -> SyntheticDocument {
    if args.malformed {
        return SyntheticDocument::malformed("no cross-reference table");
    }

    let landscape = Viewport::new(LETTER.height, LETTER.width);
    let pages = (1..=args.pages)
        .map(|page| {
            if args.mixed && page % 3 == 0 {
                landscape
            } else {
                LETTER
            }
        })
        .collect();

    let document = SyntheticDocument::with_pages(pages);
    match args.fail_at {
        Some(page) => document.failing_at(page),
        None => document,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        args.log_level,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("cannot create log file {:?}", args.log_file))?,
    )?;
    info!("Starting pageview");

    let mut viewer_config = config::load_or_default(args.config.as_deref())?;
    if let Some(zoom) = args.zoom {
        viewer_config.initial_zoom_index = zoom;
    }

    let engine = SyntheticEngine::new(viewer_config.engine.clone())
        .with_document(args.src.clone(), demo_document(&args));
    let mut viewer = DocumentViewer::new(Arc::new(engine), &viewer_config);
    viewer.set_page_num(args.page);
    viewer.set_src(args.src.clone());
    let mut app = HostApp::new(viewer);

    panic_handler::initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_host_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down pageview");
    Ok(())
}
