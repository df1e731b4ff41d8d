//! Errors raised while playing a story.

use std::path::PathBuf;

use story_model::EngineError;
use thiserror::Error;

/// Everything that can go wrong in the player.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("another story operation is already in progress")]
    Busy,

    #[error("no story is loaded")]
    NotLoaded,

    #[error("the story is not waiting for a choice")]
    NotChoosing,

    #[error("choice {index} is not on offer ({available} available)")]
    InvalidChoice { index: usize, available: usize },
}

impl PlayerError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlayerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
