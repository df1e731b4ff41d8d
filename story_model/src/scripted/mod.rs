//! Scripted stories - a small declarative engine for playing and testing.
//!
//! A script is a set of named knots. Each knot emits its lines in order, then
//! either offers choices or diverts to another knot. This is far simpler than
//! a compiled ink story but honours the same [`StoryEngine`] contract,
//! including an opaque, versioned state export.
//!
//! ```toml
//! start = "gate"
//!
//! [knots.gate]
//! lines = [{ text = "A gate stands open.", tags = ["image:gate"] }]
//! choices = [
//!     { text = "Walk through", target = "garden", once = true },
//!     { text = "Turn back", target = "road" },
//! ]
//! ```

mod script;

pub use script::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::engine::{Choice, EngineError, StoryEngine};

/// Version written into exported state. Older exports are rejected.
pub const SCRIPTED_STATE_VERSION: u32 = 1;

/// Position and history of a playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Cursor {
    version: u32,
    knot: String,
    /// Index of the next line to emit within `knot`.
    position: usize,
    /// Once-only choices already taken, as `knot#index`.
    chosen: BTreeSet<String>,
    turns: u32,
}

impl Cursor {
    fn at(knot: &str) -> Self {
        Self {
            version: SCRIPTED_STATE_VERSION,
            knot: knot.to_string(),
            position: 0,
            chosen: BTreeSet::new(),
            turns: 0,
        }
    }
}

/// A [`StoryEngine`] over a [`Script`].
#[derive(Debug, Clone)]
pub struct ScriptedStory {
    script: Script,
    cursor: Cursor,
    current_tags: Vec<String>,
}

impl ScriptedStory {
    /// Validate a script and position it at its start knot.
    pub fn new(script: Script) -> Result<Self, EngineError> {
        script.validate()?;
        let cursor = Cursor::at(&script.start);
        Ok(Self {
            script,
            cursor,
            current_tags: Vec::new(),
        })
    }

    /// Parse and validate a TOML script.
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let script: Script =
            toml::from_str(source).map_err(|e| EngineError::Script(e.to_string()))?;
        Self::new(script)
    }

    /// Parse and validate a JSON script.
    pub fn from_json_str(source: &str) -> Result<Self, EngineError> {
        let script: Script =
            serde_json::from_str(source).map_err(|e| EngineError::Script(e.to_string()))?;
        Self::new(script)
    }

    /// Parse a script read from `path`, choosing the format by extension
    /// (`.toml`, otherwise JSON).
    pub fn from_source(path: &Path, source: &str) -> Result<Self, EngineError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(source),
            _ => Self::from_json_str(source),
        }
    }

    /// Name of the knot the story is currently in, after following diverts.
    pub fn current_knot(&self) -> &str {
        self.settle().0
    }

    /// Number of choices taken since the start.
    pub fn turns(&self) -> u32 {
        self.cursor.turns
    }

    /// Follow diverts past knots that have neither lines nor choices left.
    fn settle(&self) -> (&str, usize) {
        let mut knot_name = self.cursor.knot.as_str();
        let mut position = self.cursor.position;

        // A divert chain can visit each knot at most once before it loops.
        for _ in 0..=self.script.knots.len() {
            let Some(knot) = self.script.knots.get(knot_name) else {
                break;
            };
            if position < knot.lines.len() || !self.visible_choices(knot_name).is_empty() {
                break;
            }
            match knot.divert.as_deref() {
                Some(next) => {
                    knot_name = next;
                    position = 0;
                }
                None => break,
            }
        }
        (knot_name, position)
    }

    /// Locate the next line to emit.
    fn next_line(&self) -> Option<(&str, usize)> {
        let (knot_name, position) = self.settle();
        let knot = self.script.knots.get(knot_name)?;
        (position < knot.lines.len()).then_some((knot_name, position))
    }

    /// Choices of `knot_name` that have not been used up, with their script index.
    fn visible_choices(&self, knot_name: &str) -> Vec<(usize, &ScriptChoice)> {
        self.script
            .knots
            .get(knot_name)
            .map(|knot| {
                knot.choices
                    .iter()
                    .enumerate()
                    .filter(|(i, choice)| {
                        !(choice.once && self.cursor.chosen.contains(&choice_key(knot_name, *i)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn choice_key(knot: &str, index: usize) -> String {
    format!("{}#{}", knot, index)
}

impl StoryEngine for ScriptedStory {
    fn can_continue(&self) -> bool {
        self.next_line().is_some()
    }

    fn continue_story(&mut self) -> Result<String, EngineError> {
        let (knot_name, position) = self.next_line().ok_or(EngineError::NoMoreContent)?;
        let knot_name = knot_name.to_string();
        let line = &self.script.knots[&knot_name].lines[position];
        let text = format!("{}\n", line.text);
        self.current_tags = line.tags.clone();
        self.cursor.knot = knot_name;
        self.cursor.position = position + 1;
        Ok(text)
    }

    fn current_tags(&self) -> Vec<String> {
        self.current_tags.clone()
    }

    fn current_choices(&self) -> Vec<Choice> {
        if self.can_continue() {
            return Vec::new();
        }
        self.visible_choices(self.settle().0)
            .into_iter()
            .enumerate()
            .map(|(index, (_, choice))| Choice {
                index,
                text: choice.text.clone(),
                tags: choice.tags.clone(),
            })
            .collect()
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), EngineError> {
        if self.can_continue() {
            return Err(EngineError::InvalidChoice {
                index,
                available: 0,
            });
        }
        let knot_name = self.settle().0.to_string();
        let visible = self.visible_choices(&knot_name);
        let available = visible.len();
        let (script_index, choice) = visible
            .get(index)
            .copied()
            .ok_or(EngineError::InvalidChoice { index, available })?;
        let target = choice.target.clone();
        let once = choice.once;

        if once {
            self.cursor.chosen.insert(choice_key(&knot_name, script_index));
        }
        self.cursor.knot = target;
        self.cursor.position = 0;
        self.cursor.turns += 1;
        self.current_tags.clear();
        Ok(())
    }

    fn reset_state(&mut self) -> Result<(), EngineError> {
        self.cursor = Cursor::at(&self.script.start);
        self.current_tags.clear();
        Ok(())
    }

    fn save_state(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.cursor).map_err(|e| EngineError::InvalidState(e.to_string()))
    }

    fn load_state(&mut self, state: &str) -> Result<(), EngineError> {
        let cursor: Cursor =
            serde_json::from_str(state).map_err(|e| EngineError::InvalidState(e.to_string()))?;

        if cursor.version != SCRIPTED_STATE_VERSION {
            return Err(EngineError::InvalidState(format!(
                "state version {} is not supported (expected {})",
                cursor.version, SCRIPTED_STATE_VERSION
            )));
        }
        let knot = self.script.knots.get(&cursor.knot).ok_or_else(|| {
            EngineError::InvalidState(format!("unknown knot '{}'", cursor.knot))
        })?;
        if cursor.position > knot.lines.len() {
            return Err(EngineError::InvalidState(format!(
                "position {} past the end of knot '{}'",
                cursor.position, cursor.knot
            )));
        }

        self.cursor = cursor;
        self.current_tags.clear();
        Ok(())
    }
}
