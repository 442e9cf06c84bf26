pub mod test_helpers {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::config::ViewerConfig;
    use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
    use crate::host::HostApp;
    use crate::viewer::synthetic::{LETTER, SyntheticDocument, SyntheticEngine, ViewJournal};
    use crate::viewer::{DocumentViewer, LoadPhase};

    /// How long tests wait for the loader thread
    pub const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

    /// Builder for scripted key input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events
                .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
            self
        }

        /// Scroll down n steps (press 'j' n times)
        pub fn scroll_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        /// Half screen down (Ctrl+d)
        pub fn half_screen_down(mut self) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key('d'));
            self
        }

        /// Type `page` into the page input and commit it
        pub fn go_to_page(mut self, page: &str) -> Self {
            self = self.press_char('g');
            for c in page.chars() {
                self = self.press_char(c);
            }
            self.press_key(KeyCode::Enter)
        }

        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Engine serving `count` letter-sized pages under `locator`
    pub fn uniform_engine(locator: &str, count: usize) -> SyntheticEngine {
        SyntheticEngine::default()
            .with_document(locator, SyntheticDocument::uniform(count, LETTER))
    }

    /// Viewer over `engine` with default config, plus the engine's journal
    pub fn viewer_for(engine: SyntheticEngine) -> (DocumentViewer, ViewJournal) {
        viewer_with_config(engine, &ViewerConfig::default())
    }

    pub fn viewer_with_config(
        engine: SyntheticEngine,
        config: &ViewerConfig,
    ) -> (DocumentViewer, ViewJournal) {
        let journal = engine.journal();
        (DocumentViewer::new(Arc::new(engine), config), journal)
    }

    /// Tick `viewer` until `done` holds; false on timeout
    pub fn tick_until(
        viewer: &mut DocumentViewer,
        mut done: impl FnMut(&DocumentViewer) -> bool,
    ) -> bool {
        let deadline = Instant::now() + LOAD_TIMEOUT;
        while Instant::now() < deadline {
            viewer.tick(Instant::now());
            if done(viewer) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    /// Tick until the load finishes one way or the other
    pub fn wait_for_load(viewer: &mut DocumentViewer) -> bool {
        tick_until(viewer, |v| {
            matches!(v.phase(), LoadPhase::Loaded | LoadPhase::Failed { .. })
        })
    }

    /// Host variant of [`wait_for_load`], also applying the host's echoes
    pub fn wait_for_host_load(app: &mut HostApp) -> bool {
        let deadline = Instant::now() + LOAD_TIMEOUT;
        while Instant::now() < deadline {
            app.update(Instant::now());
            if matches!(
                app.viewer().phase(),
                LoadPhase::Loaded | LoadPhase::Failed { .. }
            ) {
                app.update(Instant::now());
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Terminal buffer as text, trailing whitespace trimmed
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;

    #[test]
    fn scenario_builder_collects_keys() {
        let scenario = TestScenarioBuilder::new()
            .scroll_down(2)
            .go_to_page("12")
            .half_screen_down()
            .quit()
            .build();

        // j j g 1 2 Enter Ctrl-d q
        assert_eq!(scenario.events.len(), 8);
    }
}
