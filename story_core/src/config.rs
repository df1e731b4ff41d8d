//! Player configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlayerError, Result};

/// Message shown in place of a story that could not be opened.
pub const DEFAULT_LOAD_ERROR_MESSAGE: &str =
    "There was an error loading this story. Please try again later.";

/// Configuration for the story player.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Application-private data directory.
    pub save_root: PathBuf,

    /// Subdirectory of `save_root` holding save files.
    pub saves_dir: String,

    /// Text of the line shown when a story cannot be opened.
    pub load_error_message: String,

    /// Extension given to image tags that lack one.
    pub default_image_extension: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            save_root: PathBuf::from("./data"),
            saves_dir: "Saves".to_string(),
            load_error_message: DEFAULT_LOAD_ERROR_MESSAGE.to_string(),
            default_image_extension: story_model::DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }
}

impl PlayerConfig {
    /// Create a configuration saving under `save_root`.
    pub fn new(save_root: impl Into<PathBuf>) -> Self {
        Self {
            save_root: save_root.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| PlayerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| PlayerError::io(path, e))?;
        Self::from_toml_str(&source)
    }

    /// Directory save files are written to.
    pub fn saves_path(&self) -> PathBuf {
        self.save_root.join(&self.saves_dir)
    }

    fn validate(&self) -> Result<()> {
        if self.saves_dir.trim().is_empty() {
            return Err(PlayerError::Config("saves_dir must not be empty".into()));
        }
        if Path::new(&self.saves_dir).is_absolute() {
            return Err(PlayerError::Config(
                "saves_dir must be relative to save_root".into(),
            ));
        }
        if self.default_image_extension.trim_start_matches('.').is_empty() {
            return Err(PlayerError::Config(
                "default_image_extension must not be empty".into(),
            ));
        }
        Ok(())
    }
}
