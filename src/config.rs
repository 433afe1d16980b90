//! User settings, read from `settings.toml` in the platform config directory.
//!
//! Every field is optional in the file; anything missing takes its default.
//! Set `PHOTO_GALLERY_CONFIG` to point at a different file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};

pub const DEFAULT_OPEN_DELAY_MS: u64 = 300;
pub const DEFAULT_AUTO_PLAY_INTERVAL_MS: u64 = 4000;
pub const DEFAULT_GRID_COLUMNS: usize = 3;
pub const MAX_GRID_COLUMNS: usize = 6;

const CONFIG_FILE: &str = "settings.toml";
const APP_DIR: &str = "photo-gallery";
const CONFIG_ENV: &str = "PHOTO_GALLERY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub open_delay_ms: u64,
    pub auto_play_interval_ms: u64,
    pub assets_dir: PathBuf,
    pub grid_columns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_delay_ms: DEFAULT_OPEN_DELAY_MS,
            auto_play_interval_ms: DEFAULT_AUTO_PLAY_INTERVAL_MS,
            assets_dir: PathBuf::from("public"),
            grid_columns: DEFAULT_GRID_COLUMNS,
        }
    }
}

impl Config {
    // A zero-length timer would spin the event loop.
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms.max(1))
    }

    pub fn auto_play_interval(&self) -> Duration {
        Duration::from_millis(self.auto_play_interval_ms.max(1))
    }

    pub fn grid_columns(&self) -> usize {
        self.grid_columns.clamp(1, MAX_GRID_COLUMNS)
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs_next::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Load settings. A missing file is created with the defaults; an unreadable
/// one is reported and the defaults are used.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        let config = Config::default();
        match save_to_path(&config, &path) {
            Ok(()) => log::info!("Wrote default config to {}", path.display()),
            Err(e) => log::debug!("{e}"),
        }
        return config;
    }
    match load_from_path(&path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("{e}; using defaults");
            Config::default()
        }
    }
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| GalleryError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| GalleryError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    let io_err = |source| GalleryError::ConfigIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)
}
