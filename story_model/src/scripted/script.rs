//! Script definitions for scripted stories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::EngineError;

/// A complete scripted story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Knot the story begins in.
    pub start: String,
    pub knots: BTreeMap<String, Knot>,
}

/// A named section of a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knot {
    #[serde(default)]
    pub lines: Vec<ScriptLine>,

    #[serde(default)]
    pub choices: Vec<ScriptChoice>,

    /// Knot to flow into once lines are exhausted and no choice is on offer.
    #[serde(default)]
    pub divert: Option<String>,
}

/// One line of output and its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A choice leading to another knot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptChoice {
    pub text: String,
    pub target: String,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Hide this choice once it has been taken.
    #[serde(default)]
    pub once: bool,
}

impl Script {
    /// Check that the start knot and every choice target and divert exist.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.knots.contains_key(&self.start) {
            return Err(EngineError::Script(format!(
                "start knot '{}' is not defined",
                self.start
            )));
        }

        for (name, knot) in &self.knots {
            let targets = knot
                .choices
                .iter()
                .map(|c| c.target.as_str())
                .chain(knot.divert.as_deref());
            for target in targets {
                if !self.knots.contains_key(target) {
                    return Err(EngineError::Script(format!(
                        "knot '{}' leads to undefined knot '{}'",
                        name, target
                    )));
                }
            }
        }
        Ok(())
    }
}
