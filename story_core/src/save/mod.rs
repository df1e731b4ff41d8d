//! Save state - per-story persistence of line history and engine state.
//!
//! Each story owns two files in the saves directory, both named after the
//! story's script file:
//!
//! - `<script file name>` holds the engine's opaque state export.
//! - the same name with a `dat` extension holds the line history as JSON.
//!
//! The state file marks a save as present. A save is only restored as a
//! whole: a history without a usable engine state, or an engine state
//! without its history, is discarded and the story starts over.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use story_model::{Line, StoryEngine, StoryEntry};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};

/// Extension of the line history file.
pub const LINES_EXTENSION: &str = "dat";

/// Locations of one story's save files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePaths {
    /// Engine state export.
    pub state: PathBuf,
    /// Line history.
    pub lines: PathBuf,
}

/// Why a save on disk was not restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The state file exists but its line history does not.
    MissingHistory,
    /// The line history could not be parsed.
    CorruptHistory,
    /// The engine rejected the state export.
    CorruptState,
}

/// Outcome of restoring a story's save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    /// No save exists; the engine is untouched.
    Nothing,
    /// The engine state was loaded and this history goes with it.
    Lines(Vec<Line>),
    /// A save existed but was unusable; the engine is at its initial state.
    Discarded(DiscardReason),
}

/// Reads and writes save files under one directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    saves_dir: PathBuf,
}

impl SaveManager {
    /// Create a manager writing to `saves_dir`. The directory is created on first save.
    pub fn new(saves_dir: impl Into<PathBuf>) -> Self {
        Self {
            saves_dir: saves_dir.into(),
        }
    }

    /// Create a manager for the configured saves directory.
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.saves_path())
    }

    pub fn saves_dir(&self) -> &Path {
        &self.saves_dir
    }

    /// Compute the save file locations for a story.
    pub fn paths(&self, entry: &StoryEntry) -> Result<SavePaths> {
        let file_name = entry.file_name().ok_or_else(|| {
            PlayerError::Config(format!(
                "story file '{}' has no file name",
                entry.story_file.display()
            ))
        })?;
        let state = self.saves_dir.join(file_name);
        let mut lines = state.with_extension(LINES_EXTENSION);
        if lines == state {
            lines = state.with_extension(format!("lines.{}", LINES_EXTENSION));
        }
        Ok(SavePaths { state, lines })
    }

    /// Whether a save exists for the story.
    pub fn exists(&self, entry: &StoryEntry) -> Result<bool> {
        Ok(self.paths(entry)?.state.is_file())
    }

    /// Persist the line history and the engine state export.
    pub fn save(&self, entry: &StoryEntry, lines: &[Line], engine_state: &str) -> Result<()> {
        let paths = self.paths(entry)?;
        fs::create_dir_all(&self.saves_dir).map_err(|e| PlayerError::io(&self.saves_dir, e))?;

        let history = serde_json::to_string(lines)?;
        write_replacing(&paths.lines, &history)?;
        write_replacing(&paths.state, engine_state)?;

        info!(
            story = %entry.id,
            lines = lines.len(),
            path = %paths.state.display(),
            "Saved story progress"
        );
        Ok(())
    }

    /// Restore a story's save into `engine`.
    ///
    /// Unusable saves are logged and reported as [`Restored::Discarded`]
    /// rather than failing; only I/O errors on existing files are returned.
    pub fn load(&self, entry: &StoryEntry, engine: &mut dyn StoryEngine) -> Result<Restored> {
        let paths = self.paths(entry)?;
        let Some(engine_state) = read_if_exists(&paths.state)? else {
            debug!(story = %entry.id, "No save to restore");
            return Ok(Restored::Nothing);
        };

        let Some(history) = read_if_exists(&paths.lines)? else {
            warn!(
                story = %entry.id,
                path = %paths.lines.display(),
                "Save has engine state but no line history, starting over"
            );
            return Ok(Restored::Discarded(DiscardReason::MissingHistory));
        };

        let lines: Vec<Line> = match serde_json::from_str(&history) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(story = %entry.id, error = %e, "Line history is corrupt, starting over");
                return Ok(Restored::Discarded(DiscardReason::CorruptHistory));
            }
        };

        if let Err(e) = engine.load_state(&engine_state) {
            warn!(story = %entry.id, error = %e, "Engine rejected saved state, starting over");
            engine.reset_state()?;
            return Ok(Restored::Discarded(DiscardReason::CorruptState));
        }

        info!(story = %entry.id, lines = lines.len(), "Restored story progress");
        Ok(Restored::Lines(lines))
    }

    /// Delete a story's save files. Returns whether anything was removed.
    pub fn clear(&self, entry: &StoryEntry) -> Result<bool> {
        let paths = self.paths(entry)?;
        let removed_state = remove_if_exists(&paths.state)?;
        let removed_lines = remove_if_exists(&paths.lines)?;
        if removed_state || removed_lines {
            info!(story = %entry.id, "Cleared saved progress");
        }
        Ok(removed_state || removed_lines)
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlayerError::io(path, e)),
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PlayerError::io(path, e)),
    }
}

/// Write through a sibling temp file so a crash never leaves a torn file.
fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(|e| PlayerError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| PlayerError::io(path, e))
}
