//! Story entries - which compiled script a player should open.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(pub Uuid);

impl StoryId {
    /// Create a new random story ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a story ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A story as listed by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub id: StoryId,
    pub title: String,
    /// Path to the compiled script.
    pub story_file: PathBuf,
}

impl StoryEntry {
    /// Create an entry for the given script file, titled after its file stem.
    pub fn new(story_file: impl Into<PathBuf>) -> Self {
        let story_file = story_file.into();
        let title = story_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: StoryId::new(),
            title,
            story_file,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The bare file name of the script, without any directories.
    ///
    /// Save files are named after this.
    pub fn file_name(&self) -> Option<&Path> {
        self.story_file.file_name().map(Path::new)
    }
}
