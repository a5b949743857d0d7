//! Viewer configuration
//!
//! Read from `viewer.ron` next to the executable's working directory on
//! native builds. Every field has a default so a partial file is fine; wasm
//! builds always use the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::segment::{parse_blueprints, SegmentBlueprint};
use crate::ui::LogWindowLayout;

pub const CONFIG_FILE: &str = "viewer.ron";

pub const MIN_TICK_RATE: u32 = 1;
pub const MAX_TICK_RATE: u32 = 240;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Cap on catch-up ticks after a slow frame
    pub max_ticks_per_frame: u32,
    /// Segment shown at startup (first segment if unset or unknown)
    pub initial_segment: Option<String>,
    /// Directory of extra `*.ron` blueprint files
    pub segments_dir: Option<PathBuf>,
    /// Where preferences are stored (platform config dir if unset)
    pub prefs_dir: Option<PathBuf>,
    /// Layout used when nothing has been persisted yet
    pub log_window: LogWindowLayout,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_ticks_per_frame: 8,
            initial_segment: None,
            segments_dir: None,
            prefs_dir: None,
            log_window: LogWindowLayout::default(),
        }
    }
}

impl ViewerConfig {
    pub fn parse(source: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ViewerConfig = ron::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, path)
    }

    /// Defaults when the file is missing; a broken file is logged and ignored
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.tick_rate = self.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE);
        self.max_ticks_per_frame = self.max_ticks_per_frame.max(1);
        self
    }

    /// Seconds per simulation tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE) as f32
    }
}

/// Parse every `*.ron` file in `dir`, sorted by file name
pub fn load_blueprint_dir(dir: &Path) -> Result<Vec<SegmentBlueprint>, ConfigError> {
    let io_err = |source| ConfigError::Io { path: dir.to_path_buf(), source };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("ron"))
        .collect();
    paths.sort();

    let mut blueprints = Vec::new();
    for path in paths {
        let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_blueprints(&source).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("{}: {} blueprint(s)", path.display(), parsed.len());
        blueprints.extend(parsed);
    }
    Ok(blueprints)
}
