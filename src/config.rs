/// Application settings, stored as TOML.
///
/// Sections:
/// - `[source]` where the items come from
/// - `[grid]` tile width and spacing
/// - `[lightbox]` video behaviour
/// - `[media]` thumbnail size and network timeout
///
/// The default file lives at `<config_dir>/media-gallery/settings.toml`.
/// A missing default file is created with the defaults; a missing file that
/// was asked for explicitly is an error.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{GalleryError, Result};

const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub grid: GridConfig,
    pub lightbox: LightboxConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON export or SQLite catalog; the default catalog when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub tile_width: f32,
    pub spacing: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_width: 180.0,
            spacing: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    pub autoplay_video: bool,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            autoplay_video: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Pixel width of generated thumbnails
    pub thumbnail_width: u32,
    pub http_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            thumbnail_width: 360,
            http_timeout_secs: 20,
        }
    }
}

impl MediaConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match default_path() {
                Some(path) => Self::load_or_create(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load `path`, writing the defaults there first if it does not exist yet
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from_path(path);
        }
        let config = Self::default();
        match config.save_to_path(path) {
            Ok(()) => info!(path = %path.display(), "wrote default settings"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not write default settings"),
        }
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| GalleryError::io(path, e))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| GalleryError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GalleryError::io(parent, e))?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| GalleryError::Config(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| GalleryError::io(path, e))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.grid.tile_width.is_finite() && self.grid.tile_width > 0.0) {
            return Err(GalleryError::Config("grid.tile_width must be positive".into()));
        }
        if !(self.grid.spacing.is_finite() && self.grid.spacing >= 0.0) {
            return Err(GalleryError::Config("grid.spacing must not be negative".into()));
        }
        if self.media.thumbnail_width == 0 {
            return Err(GalleryError::Config("media.thumbnail_width must be positive".into()));
        }
        if self.media.http_timeout_secs == 0 {
            return Err(GalleryError::Config("media.http_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// `<config_dir>/media-gallery/settings.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("media-gallery").join(CONFIG_FILE))
}
