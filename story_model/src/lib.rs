//! # Story Model
//!
//! The data model shared by everything that plays a story: displayed lines,
//! story entries, and the contract a narrative engine has to fulfil.
//! This crate holds no progression or persistence logic.

pub mod engine;
pub mod entry;
pub mod line;
pub mod scripted;

pub use engine::*;
pub use entry::*;
pub use line::*;
pub use scripted::*;
