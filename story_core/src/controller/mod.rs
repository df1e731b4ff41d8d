//! Story Progression Controller - drives an engine and records what it says.
//!
//! The controller owns one engine for one story entry. It pulls output until
//! the engine runs dry, turns each unit into a [`Line`], and then either waits
//! for a choice or declares the story complete:
//!
//! ```text
//! Loading ─► Advancing ─► Choosing ─► Advancing ─► ... ─► Complete
//!    │            ▲                                          │
//!    │            └───────────────── restart ◄───────────────┘
//!    └─► Failed (engine could not be opened, or failed mid-story)
//! ```
//!
//! Every change is published on the controller's [`EventBus`].

mod phase;

pub use phase::*;

use story_model::{
    extract_image_with_extension, Choice, EngineError, Line, StoryEngine, StoryEntry,
};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use crate::events::{EventBus, StoryEvent};
use crate::save::{Restored, SaveManager};

/// Read-only view of a controller for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySnapshot {
    pub phase: Phase,
    pub lines: Vec<Line>,
    pub choices: Vec<Choice>,
    pub is_complete: bool,
    pub has_choices: bool,
}

/// Drives one story's engine and keeps its line history.
pub struct StoryController {
    entry: StoryEntry,
    config: PlayerConfig,
    saves: SaveManager,
    events: EventBus,
    engine: Option<Box<dyn StoryEngine>>,
    lines: Vec<Line>,
    phase: Phase,
}

impl StoryController {
    /// Create a controller for `entry`, waiting for its engine.
    pub fn new(entry: StoryEntry, config: PlayerConfig) -> Self {
        let saves = SaveManager::from_config(&config);
        Self {
            entry,
            config,
            saves,
            events: EventBus::new(),
            engine: None,
            lines: Vec::new(),
            phase: Phase::Loading,
        }
    }

    /// Publish events on an existing bus instead of a private one.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Attach the engine opened for this story, restore any save, and advance.
    ///
    /// A failed open is not an error for the caller: the reader sees a single
    /// error line and the story is over.
    ///
    /// Only the first call has any effect, whether or not the open succeeded.
    pub fn load(
        &mut self,
        opened: std::result::Result<Box<dyn StoryEngine>, EngineError>,
    ) -> Result<()> {
        if self.phase != Phase::Loading {
            debug!(story = %self.entry.id, phase = %self.phase, "Story already loaded, ignoring");
            return Ok(());
        }

        let mut engine = match opened {
            Ok(engine) => engine,
            Err(e) => {
                warn!(story = %self.entry.id, error = %e, "Failed to open story");
                self.push_error_line();
                self.set_phase(Phase::Failed);
                return Ok(());
            }
        };

        let restored = match self.saves.load(&self.entry, engine.as_mut()) {
            Ok(restored) => restored,
            Err(e) => {
                warn!(story = %self.entry.id, error = %e, "Could not read save, starting over");
                engine.reset_state()?;
                Restored::Nothing
            }
        };
        if let Restored::Lines(lines) = restored {
            self.lines = lines;
            self.events.emit(&StoryEvent::LinesRestored(self.lines.len()));
        }

        info!(story = %self.entry.id, title = %self.entry.title, "Loaded story");
        self.engine = Some(engine);
        self.advance()
    }

    /// Pull all pending output from the engine, then wait for a choice or finish.
    ///
    /// An engine error ends the story in [`Phase::Failed`] and is returned.
    pub fn advance(&mut self) -> Result<()> {
        if self.engine.is_none() {
            return match self.phase {
                Phase::Failed => Ok(()),
                _ => Err(PlayerError::NotLoaded),
            };
        }
        self.set_phase(Phase::Advancing);

        let choices = match self.pull_lines() {
            Ok(choices) => choices,
            Err(e) => {
                warn!(story = %self.entry.id, error = %e, "Engine failed while advancing");
                self.set_phase(Phase::Failed);
                return Err(e);
            }
        };
        if choices.is_empty() {
            self.set_phase(Phase::Complete);
        } else {
            self.events.emit(&StoryEvent::ChoicesChanged(choices));
            self.set_phase(Phase::Choosing);
        }
        Ok(())
    }

    /// Take one of the choices on offer and continue the story.
    pub fn choose(&mut self, index: usize) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(PlayerError::NotLoaded)?;
        if self.phase != Phase::Choosing {
            return Err(PlayerError::NotChoosing);
        }

        let choices = engine.current_choices();
        if !choices.iter().any(|c| c.index == index) {
            return Err(PlayerError::InvalidChoice {
                index,
                available: choices.len(),
            });
        }

        debug!(story = %self.entry.id, index, "Choice taken");
        engine.choose_choice_index(index)?;
        self.events.emit(&StoryEvent::ChoicesChanged(Vec::new()));
        self.advance()
    }

    /// Start the story over, forgetting history and any save.
    pub fn restart(&mut self) -> Result<()> {
        if self.phase == Phase::Loading {
            return Err(PlayerError::NotLoaded);
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.reset_state()?;
        }

        self.lines.clear();
        self.events.emit(&StoryEvent::LinesCleared);
        if self.saves.clear(&self.entry)? {
            self.events.emit(&StoryEvent::SaveCleared);
        }
        if self.phase == Phase::Choosing {
            self.events.emit(&StoryEvent::ChoicesChanged(Vec::new()));
        }
        info!(story = %self.entry.id, "Restarted story");

        if self.engine.is_none() {
            self.push_error_line();
            return Ok(());
        }
        self.advance()
    }

    /// Offer the current choices again, if there are any.
    ///
    /// Returns whether the controller is now choosing.
    pub fn show_choices(&mut self) -> bool {
        let choices = self.choices();
        if choices.is_empty() {
            return false;
        }
        self.events.emit(&StoryEvent::ChoicesChanged(choices));
        self.set_phase(Phase::Choosing);
        true
    }

    /// Persist the line history and engine state.
    ///
    /// Does nothing when no engine is attached.
    pub fn save(&self) -> Result<()> {
        let Some(engine) = self.engine.as_ref() else {
            return Ok(());
        };
        let engine_state = engine.save_state()?;
        self.saves.save(&self.entry, &self.lines, &engine_state)?;
        self.events.emit(&StoryEvent::Saved);
        Ok(())
    }

    /// True when the engine has no more output pending, or the story failed to open.
    pub fn is_complete(&self) -> bool {
        match &self.engine {
            Some(engine) => !engine.can_continue(),
            None => self.phase == Phase::Failed,
        }
    }

    /// True when the engine offers at least one choice.
    pub fn has_choices(&self) -> bool {
        !self.choices().is_empty()
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.engine
            .as_ref()
            .map(|engine| engine.current_choices())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entry(&self) -> &StoryEntry {
        &self.entry
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn snapshot(&self) -> StorySnapshot {
        let choices = self.choices();
        StorySnapshot {
            phase: self.phase,
            lines: self.lines.clone(),
            has_choices: !choices.is_empty(),
            choices,
            is_complete: self.is_complete(),
        }
    }

    fn pull_lines(&mut self) -> Result<Vec<Choice>> {
        let engine = self.engine.as_mut().ok_or(PlayerError::NotLoaded)?;
        while engine.can_continue() {
            let text = engine.continue_story()?;
            let tags = engine.current_tags();
            let image = extract_image_with_extension(&tags, &self.config.default_image_extension);
            let line = Line { text, image };
            debug!(story = %self.entry.id, line = %line, "Story line");
            self.events.emit(&StoryEvent::LineAdded(line.clone()));
            self.lines.push(line);
        }
        Ok(engine.current_choices())
    }

    fn push_error_line(&mut self) {
        let line = Line::new(self.config.load_error_message.clone());
        self.events.emit(&StoryEvent::LineAdded(line.clone()));
        self.lines.push(line);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(story = %self.entry.id, from = %self.phase, to = %phase, "Phase change");
            self.phase = phase;
            self.events.emit(&StoryEvent::PhaseChanged(phase));
        }
    }
}

impl std::fmt::Debug for StoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryController")
            .field("entry", &self.entry)
            .field("phase", &self.phase)
            .field("lines", &self.lines.len())
            .field("loaded", &self.engine.is_some())
            .finish()
    }
}
