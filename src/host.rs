//! Terminal host for the document viewer
//!
//! Plays the part of the page embedding the viewer: it owns the scroll
//! container, draws the toolbar and the page column, turns keys into
//! interactions, and echoes the viewer's change requests back into its
//! properties.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use flume::{Receiver, Sender};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::event_source::EventSource;
use crate::viewer::{DocumentViewer, Interaction, PageChange, ToolbarModel, total_height};

/// Pixels per terminal row
pub const ROW_PX: f32 = 16.0;
/// Pixels per terminal column
pub const COL_PX: f32 = 8.0;

/// Rows moved by one `j`/`k`
const SCROLL_STEP_ROWS: f32 = 3.0;

/// Change requested by the viewer through its callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostRequest {
    Page(PageChange),
    Zoom(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the page number input
    PageInput(String),
}

/// Host application state
pub struct HostApp {
    viewer: DocumentViewer,
    requests: Receiver<HostRequest>,
    /// Scroll position of the page column in pixels
    scroll_offset: f32,
    /// Height of the page column in pixels, from the last draw
    viewport_height: f32,
    input_mode: InputMode,
    should_quit: bool,
}

impl HostApp {
    /// Embed `viewer`, wiring its callbacks back into its own properties
    pub fn new(mut viewer: DocumentViewer) -> Self {
        let (tx, rx): (Sender<HostRequest>, Receiver<HostRequest>) = flume::unbounded();

        let page_tx = tx.clone();
        viewer.on_page_change(move |change| {
            let _ = page_tx.send(HostRequest::Page(change));
        });
        viewer.on_zoom_change(move |index| {
            let _ = tx.send(HostRequest::Zoom(index));
        });

        Self {
            viewer,
            requests: rx,
            scroll_offset: 0.0,
            viewport_height: 0.0,
            input_mode: InputMode::Normal,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn viewer(&self) -> &DocumentViewer {
        &self.viewer
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    #[must_use]
    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply the viewer's pending requests, loader results and timers
    pub fn update(&mut self, now: Instant) -> bool {
        let mut changed = self.viewer.tick(now);

        // Requests can trigger further requests (scroll -> page), drain until quiet
        loop {
            let pending: Vec<HostRequest> = self.requests.try_iter().collect();
            for request in &pending {
                debug!("Host applying {request:?}");
                match *request {
                    HostRequest::Page(change) => self.viewer.set_page_num(change.page),
                    HostRequest::Zoom(index) => self.viewer.set_zoom_index(index),
                }
            }

            let scroll = self.viewer.take_scroll_request();
            if pending.is_empty() && scroll.is_none() {
                break;
            }
            if let Some(offset) = scroll {
                self.scroll_to(offset);
            }
            changed = true;
        }

        changed
    }

    /// Move the scroll container to `offset` as far as it can go. When the
    /// container cannot reach it the viewer learns where it actually ended up.
    fn scroll_to(&mut self, offset: f32) {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll());
        if self.scroll_offset != offset {
            debug!("Scroll to {offset} clamped to {}", self.scroll_offset);
            self.notify_scroll();
        }
    }

    fn notify_scroll(&mut self) {
        self.viewer.handle(Interaction::Scroll {
            offset: self.scroll_offset,
            viewport_height: self.viewport_height,
        });
    }

    fn max_scroll(&self) -> f32 {
        let heights = self.viewer.state().heights();
        let total = total_height(&heights, self.viewer.state().layout.page_margin);
        (total - self.viewport_height).max(0.0)
    }

    /// Move the scroll container and tell the viewer
    pub fn scroll_by(&mut self, delta_px: f32) {
        self.scroll_offset = (self.scroll_offset + delta_px).clamp(0.0, self.max_scroll());
        self.notify_scroll();
    }

    /// Set the page column height (in pixels) without drawing
    pub fn set_viewport_height(&mut self, height_px: f32) {
        self.viewport_height = height_px;
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let InputMode::PageInput(text) = &mut self.input_mode {
            let max_digits = self.viewer.toolbar().page_input_max.to_string().len();
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() && text.len() < max_digits => text.push(c),
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Enter => {
                    let input = std::mem::take(text);
                    self.input_mode = InputMode::Normal;
                    self.viewer.handle(Interaction::GoToPage(input));
                }
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                _ => {}
            }
            return;
        }

        self.handle_normal_key(key);
    }

    fn handle_normal_key(&mut self, key: &KeyEvent) {
        let half_screen = (self.viewport_height / 2.0).max(ROW_PX);

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(half_screen);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(-half_screen);
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(SCROLL_STEP_ROWS * ROW_PX),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-SCROLL_STEP_ROWS * ROW_PX),
            KeyCode::Char('n') | KeyCode::PageDown => self.viewer.handle(Interaction::PageDown),
            KeyCode::Char('p') | KeyCode::PageUp => self.viewer.handle(Interaction::PageUp),
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewer.handle(Interaction::Magnify),
            KeyCode::Char('-') => self.viewer.handle(Interaction::Minify),
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                self.viewer.handle(Interaction::SelectZoom(index));
            }
            KeyCode::Char('g') => self.input_mode = InputMode::PageInput(String::new()),
            _ => {}
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_toolbar(f, chunks[0]);

        let column = chunks[1];
        self.viewport_height = f32::from(column.height) * ROW_PX;
        let max_scroll = self.max_scroll();
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
            self.notify_scroll();
        }
        self.draw_pages(f, column);

        let help = match self.input_mode {
            InputMode::Normal => {
                "j/k: Scroll | n/p: Page | g: Go to page | +/-/1-7: Zoom | q: Quit"
            }
            InputMode::PageInput(_) => "Type a page number | Enter: Go | Esc: Cancel",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }

    fn draw_toolbar(&self, f: &mut Frame, area: Rect) {
        let toolbar = self.viewer.toolbar();
        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Rgb(0x47, 0x47, 0x47)));
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(Paragraph::new(toolbar_line(&toolbar, &self.input_mode)), inner);
    }

    fn draw_pages(&self, f: &mut Frame, area: Rect) {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(0x77, 0x77, 0x77))),
            area,
        );

        let state = self.viewer.state();
        let margin = state.layout.page_margin;
        let view_top = self.scroll_offset;
        let view_bottom = view_top + f32::from(area.height) * ROW_PX;
        let mut page_top = 0.0;

        for (index, size) in state.page_sizes().iter().enumerate() {
            let page = index + 1;
            let page_bottom = page_top + size.height;

            if page_bottom > view_top && page_top < view_bottom {
                let top_row = ((page_top - view_top) / ROW_PX).round() as i32;
                let bottom_row = ((page_bottom - view_top) / ROW_PX).round() as i32;
                let first = top_row.max(0) as u16;
                let last = bottom_row.min(i32::from(area.height)) as u16;

                if last > first {
                    let width = ((size.width / COL_PX).round() as u16).max(4).min(area.width);
                    let rect = Rect {
                        x: area.x + (area.width - width) / 2,
                        y: area.y + first,
                        width,
                        height: last - first,
                    };
                    let drawn = state.window.is_some_and(|w| w.contains(page));
                    f.render_widget(page_block(page, drawn), rect);
                }
            }

            page_top = page_bottom + margin;
            if page_top >= view_bottom {
                break;
            }
        }
    }
}

fn page_block(page: usize, drawn: bool) -> Paragraph<'static> {
    let (body, style) = if drawn {
        ("rendered", Style::default().fg(Color::Black).bg(Color::White))
    } else {
        ("released", Style::default().fg(Color::DarkGray).bg(Color::Gray))
    };
    Paragraph::new(body).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Page {page} ")),
    )
}

fn control(label: &str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    Span::styled(format!("[{label}]"), style)
}

/// Single toolbar line: paging buttons, page input, zoom controls, status
#[must_use]
pub fn toolbar_line(toolbar: &ToolbarModel, input_mode: &InputMode) -> Line<'static> {
    let page_input = match input_mode {
        InputMode::Normal => format!("[{:>4}]", toolbar.page_input),
        InputMode::PageInput(text) => format!("[{text:>4}_]"),
    };

    let mut spans = vec![
        control("Page Up", toolbar.page_up_enabled),
        Span::raw(" "),
        control("Page Down", toolbar.page_down_enabled),
        Span::raw("  "),
        Span::styled(page_input, Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("{:<9}", toolbar.page_count_label),
            Style::default().fg(Color::White),
        ),
        control("−", toolbar.minify_enabled),
        Span::raw(" "),
        control("+", toolbar.magnify_enabled),
        Span::raw(" "),
        Span::styled(
            format!("[{:>4} ▾]", toolbar.zoom_label()),
            Style::default().fg(Color::Black).bg(Color::White),
        ),
    ];

    if let Some(status) = &toolbar.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    Line::from(spans)
}

pub fn run_host_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut HostApp,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut needs_redraw = true;

    loop {
        if app.update(Instant::now()) {
            needs_redraw = true;
        }
        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
            needs_redraw = false;
        }

        // Wake up in time for a pending settle
        let timeout = app
            .viewer()
            .settle_remaining(Instant::now())
            .map_or(tick_rate, |left| left.min(tick_rate));
        if event_source.poll(timeout)? {
            let event = event_source.read()?;
            app.handle_event(&event);
            needs_redraw = true;
        }

        if app.should_quit() {
            info!("Quit requested");
            return Ok(());
        }
    }
}
