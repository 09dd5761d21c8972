/// Editor and viewer settings
///
/// Settings live in a small JSON file in the user's config directory:
/// - Linux: ~/.config/catalog-editor/settings.json
/// - macOS: ~/Library/Application Support/catalog-editor/settings.json
/// - Windows: %APPDATA%\catalog-editor\settings.json
///
/// Every field has a serde default, so a partial or missing file still
/// produces a usable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "catalog-editor";

/// Default snapshot file name, shared by the editor and the viewer
pub const SNAPSHOT_FILE_NAME: &str = "catalog_data.json";

/// Number of product slots in every catalog
pub const CATALOG_CAPACITY: usize = 200;

/// Default upper bound for a compressed image, in kilobytes
pub const DEFAULT_MAX_IMAGE_KB: u32 = 200;

/// Longest side an ingested image may keep, in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// JPEG qualities tried in order, 0.9 down to 0.1
pub const QUALITY_LADDER: [u8; 9] = [90, 80, 70, 60, 50, 40, 30, 20, 10];

/// Persistent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Local JSON snapshot used for autoload, export default and the viewer
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Directory backing the bundled remote catalog store
    #[serde(default = "default_remote_dir")]
    pub remote_dir: PathBuf,

    /// Target size for compressed images
    #[serde(default = "default_max_image_kb")]
    pub max_image_kb: u32,

    /// Longest side kept when downscaling
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Quiet period before a typed product name is committed
    #[serde(default = "default_name_debounce_ms")]
    pub name_debounce_ms: u64,

    /// Sort viewer buckets by product name
    #[serde(default = "default_sort_viewer_by_name")]
    pub sort_viewer_by_name: bool,
}

fn data_root() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn default_data_file() -> PathBuf {
    data_root().join(SNAPSHOT_FILE_NAME)
}

fn default_remote_dir() -> PathBuf {
    data_root().join("remote")
}

fn default_max_image_kb() -> u32 {
    DEFAULT_MAX_IMAGE_KB
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_name_debounce_ms() -> u64 {
    300
}

fn default_sort_viewer_by_name() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            remote_dir: default_remote_dir(),
            max_image_kb: default_max_image_kb(),
            max_dimension: default_max_dimension(),
            name_debounce_ms: default_name_debounce_ms(),
            sort_viewer_by_name: default_sort_viewer_by_name(),
        }
    }
}

impl Settings {
    /// Path of the settings file
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push("settings.json");
        path
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults
    ///
    /// A missing file is normal on first launch; a corrupt one is logged
    /// and ignored rather than blocking startup.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::CatalogError::Io(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Byte budget for one compressed image
    pub fn max_image_bytes(&self) -> usize {
        self.max_image_kb as usize * 1024
    }
}
