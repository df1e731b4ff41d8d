//! # Story Core
//!
//! The player side of interactive fiction. This crate takes an engine from
//! `story_model`, drives it, and keeps the reader's progress on disk.
//!
//! ## Core Components
//!
//! - **controller**: The progression loop (advance, choose, restart)
//! - **save**: Per-story save files for line history and engine state
//! - **session**: Single-writer access to a controller, with asynchronous loading
//! - **provider**: Opening engines for story entries
//! - **events**: Notifications for whatever presents the story
//!
//! ## Design Philosophy
//!
//! - **Opaque Engine**: Narrative semantics belong to the engine; the player only reads
//!   output and forwards choices
//! - **Event-Driven**: Presentation reacts to events rather than polling properties
//! - **Whole Saves**: A save is restored completely or not at all

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod provider;
pub mod save;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use controller::*;
pub use error::{PlayerError, Result};
pub use events::*;
pub use provider::*;
pub use save::*;
pub use session::*;
