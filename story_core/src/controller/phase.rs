//! Controller phases.

use serde::{Deserialize, Serialize};

/// Where a story's progression stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Waiting for the engine to be opened.
    #[default]
    Loading,
    /// Pulling output from the engine.
    Advancing,
    /// Output exhausted, choices on offer.
    Choosing,
    /// Output exhausted, nothing on offer.
    Complete,
    /// The engine could not be opened, or failed while advancing. Terminal.
    Failed,
}

impl Phase {
    /// Whether the reader has nothing left to do but restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Advancing => "advancing",
            Phase::Choosing => "choosing",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}
