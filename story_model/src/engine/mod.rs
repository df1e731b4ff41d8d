//! The narrative engine contract.
//!
//! A story engine executes a compiled script. The player never looks inside
//! it: it asks whether more output is pending, pulls output one unit at a
//! time, reads the choices on offer, and forwards the reader's selection.
//! The engine's internal state crosses the boundary only as an opaque string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a story engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no more content: the story cannot continue")]
    NoMoreContent,

    #[error("choice index {index} out of range ({available} available)")]
    InvalidChoice { index: usize, available: usize },

    #[error("invalid engine state: {0}")]
    InvalidState(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("story unavailable: {0}")]
    Unavailable(String),
}

/// An option the engine currently offers the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Position in the engine's current choice list.
    pub index: usize,
    /// Display label.
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Choice {
    /// Create a choice with no tags.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            tags: Vec::new(),
        }
    }
}

/// An opaque story-execution runtime.
pub trait StoryEngine: Send {
    /// Whether another unit of output is pending.
    fn can_continue(&self) -> bool;

    /// Produce the next unit of output.
    fn continue_story(&mut self) -> Result<String, EngineError>;

    /// Tags attached to the most recently produced output.
    fn current_tags(&self) -> Vec<String>;

    /// Choices on offer once output is exhausted.
    fn current_choices(&self) -> Vec<Choice>;

    /// Select one of the current choices by index.
    fn choose_choice_index(&mut self, index: usize) -> Result<(), EngineError>;

    /// Return to the script's initial state.
    fn reset_state(&mut self) -> Result<(), EngineError>;

    /// Export the internal state.
    fn save_state(&self) -> Result<String, EngineError>;

    /// Replace the internal state with a previously exported one.
    ///
    /// On error the engine state is unspecified; callers reset it.
    fn load_state(&mut self, state: &str) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_creation() {
        let choice = Choice::new(2, "Open the door");
        assert_eq!(choice.index, 2);
        assert_eq!(choice.text, "Open the door");
        assert!(choice.tags.is_empty());
    }

    #[test]
    fn test_invalid_choice_message() {
        let err = EngineError::InvalidChoice {
            index: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "choice index 3 out of range (2 available)");
    }
}
