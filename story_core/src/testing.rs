//! Shared fixtures for unit tests.

use std::path::Path;

use story_model::{ScriptedStory, StoryEntry};
use tempfile::TempDir;

use crate::config::PlayerConfig;

/// A two-choice story that can end or loop back for a second visit.
pub const LIGHTHOUSE: &str = r#"
start = "shore"

[knots.shore]
lines = [
    { text = "Waves break against the rocks.", tags = ["image:shore"] },
    { text = "A lighthouse blinks on the headland." },
]
choices = [
    { text = "Climb to the lighthouse", target = "lamp_room", once = true },
    { text = "Walk along the beach", target = "beach" },
]

[knots.beach]
lines = [{ text = "The tide has left a bottle on the sand.", tags = ["image:bottle.png"] }]
divert = "shore_again"

[knots.shore_again]
lines = [{ text = "You come back to the rocks." }]
choices = [
    { text = "Climb to the lighthouse", target = "lamp_room" },
]

[knots.lamp_room]
lines = [
    { text = "The keeper hands you a lantern." },
    { text = "The end." },
]
"#;

pub fn lighthouse() -> ScriptedStory {
    ScriptedStory::from_toml_str(LIGHTHOUSE).expect("fixture script is valid")
}

/// A temporary data directory, removed on drop.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> PlayerConfig {
        PlayerConfig::new(self.dir.path())
    }
}

pub fn lighthouse_entry() -> StoryEntry {
    StoryEntry::new("stories/lighthouse.json").with_title("The Lighthouse")
}

/// An engine that claims output is pending but fails to produce it.
pub struct BrokenEngine;

impl story_model::StoryEngine for BrokenEngine {
    fn can_continue(&self) -> bool {
        true
    }

    fn continue_story(&mut self) -> Result<String, story_model::EngineError> {
        Err(story_model::EngineError::Script("bytecode corrupted".into()))
    }

    fn current_tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn current_choices(&self) -> Vec<story_model::Choice> {
        Vec::new()
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), story_model::EngineError> {
        Err(story_model::EngineError::InvalidChoice { index, available: 0 })
    }

    fn reset_state(&mut self) -> Result<(), story_model::EngineError> {
        Ok(())
    }

    fn save_state(&self) -> Result<String, story_model::EngineError> {
        Ok(String::new())
    }

    fn load_state(&mut self, _state: &str) -> Result<(), story_model::EngineError> {
        Ok(())
    }
}
