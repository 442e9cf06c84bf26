use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::viewer::{
    DEFAULT_ZOOM_INDEX, EngineOptions, Layout, PAGE_MARGIN, SETTLE_DELAY, WINDOW_RADIUS,
};

pub const CURRENT_VERSION: u32 = 1;
const CONFIG_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pageview";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Viewer configuration, passed to the viewer at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Options handed to the document engine
    #[serde(default)]
    pub engine: EngineOptions,

    /// Pages kept drawn on each side of the current page
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,

    /// Quiet period after scrolling before the render window moves
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Gap between pages in pixels
    #[serde(default = "default_page_margin")]
    pub page_margin: f32,

    #[serde(default = "default_zoom_index")]
    pub initial_zoom_index: usize,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_window_radius() -> usize {
    WINDOW_RADIUS
}

fn default_settle_delay_ms() -> u64 {
    SETTLE_DELAY.as_millis() as u64
}

fn default_page_margin() -> f32 {
    PAGE_MARGIN
}

fn default_zoom_index() -> usize {
    DEFAULT_ZOOM_INDEX
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            engine: EngineOptions::default(),
            window_radius: default_window_radius(),
            settle_delay_ms: default_settle_delay_ms(),
            page_margin: default_page_margin(),
            initial_zoom_index: default_zoom_index(),
        }
    }
}

impl ViewerConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Layout for the view state, with the window radius capped at
    /// [`WINDOW_RADIUS`]
    #[must_use]
    pub fn layout(&self) -> Layout {
        let window_radius = self.window_radius.clamp(1, WINDOW_RADIUS);
        if window_radius != self.window_radius {
            warn!(
                "window_radius {} outside 1..={WINDOW_RADIUS}, using {window_radius}",
                self.window_radius
            );
        }

        Layout {
            window_radius,
            page_margin: self.page_margin,
        }
    }
}

/// `<config dir>/pageview/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(CONFIG_FILENAME))
}

/// Read a config file
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config =
        serde_yaml::from_str::<ViewerConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded config from {path:?}");

    if config.version > CURRENT_VERSION {
        warn!(
            "Config {path:?} has version {} (newer than {CURRENT_VERSION}), unknown keys are ignored",
            config.version
        );
    }
    Ok(config)
}

/// Load `path`, or the default location when `path` is `None`.
///
/// A missing file at the default location is created with defaults; a
/// missing explicit path is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    let Some(path) = default_config_path() else {
        warn!("Could not determine config directory, using default config");
        return Ok(ViewerConfig::default());
    };

    if path.exists() {
        return load_config(&path);
    }

    info!("Config file not found, creating with defaults at {path:?}");
    let config = ViewerConfig::default();
    if let Err(e) = save_config(&config, &path) {
        warn!("{e}");
    }
    Ok(config)
}

pub fn save_config(config: &ViewerConfig, path: &Path) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let body = serde_yaml::to_string(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, format!("{CONFIG_HEADER}{body}")).map_err(io_error)?;
    debug!("Saved config to {path:?}");
    Ok(())
}

const CONFIG_HEADER: &str = r#"# pageview configuration
#
# engine.worker_src   location of the document engine's worker, if any
# window_radius       pages kept drawn above and below the current page (1..5)
# settle_delay_ms     quiet time after scrolling before pages are redrawn
# page_margin         gap between pages in pixels
# initial_zoom_index  0..6 for 50%, 75%, 100%, 125%, 150%, 175%, 200%

"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_viewer_constants() {
        let config = ViewerConfig::default();
        assert_eq!(config.window_radius, 5);
        assert_eq!(config.settle_delay(), Duration::from_millis(1000));
        assert_eq!(config.page_margin, 20.0);
        assert_eq!(config.initial_zoom_index, 2);
        assert_eq!(config.engine.worker_src, None);
    }

    #[test]
    fn window_radius_is_capped() {
        let wide = ViewerConfig {
            window_radius: 20,
            ..ViewerConfig::default()
        };
        assert_eq!(wide.layout().window_radius, WINDOW_RADIUS);

        let none = ViewerConfig {
            window_radius: 0,
            ..ViewerConfig::default()
        };
        assert_eq!(none.layout().window_radius, 1);

        let narrow = ViewerConfig {
            window_radius: 2,
            ..ViewerConfig::default()
        };
        assert_eq!(narrow.layout().window_radius, 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "engine:\n  worker_src: \"https://example.com/worker.js\"\nwindow_radius: 2\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.engine.worker_src.as_deref(),
            Some("https://example.com/worker.js")
        );
        assert_eq!(config.window_radius, 2);
        assert_eq!(config.settle_delay_ms, 1000);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = ViewerConfig {
            settle_delay_ms: 250,
            initial_zoom_index: 4,
            ..ViewerConfig::default()
        };

        save_config(&config, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# pageview configuration"));
        assert!(content.contains("\nengine: {}\n"), "{content}");
        assert!(!content.contains("worker_src:"), "{content}");
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "window_radius: [not a number\n").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_explicit_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_or_default(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
