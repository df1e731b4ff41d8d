//! Lines - the units of output a reader sees.

mod image;

pub use image::*;

use serde::{Deserialize, Serialize};

/// A single displayed narrative unit.
///
/// Lines are created once per unit of engine output and never modified after
/// being appended to a history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Story prose. May be empty.
    #[serde(default)]
    pub text: String,

    /// Inline illustration file name, empty when the line has none.
    #[serde(default)]
    pub image: String,
}

impl Line {
    /// Create a text line with no image.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: String::new(),
        }
    }

    /// Attach an illustration.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// Prose without an illustration.
    pub fn is_text_only(&self) -> bool {
        self.has_text() && !self.has_image()
    }

    /// An illustration with no prose alongside it.
    pub fn is_image_only(&self) -> bool {
        self.has_image() && !self.has_text()
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_image() {
            write!(f, "[{}] ", self.image)?;
        }
        write!(f, "{}", self.text.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_line() {
        let line = Line::new("The rain kept falling.\n");
        assert!(line.has_text());
        assert!(line.is_text_only());
        assert!(!line.is_image_only());
    }

    #[test]
    fn test_image_only_line() {
        let line = Line::new("\n").with_image("forest.png");
        assert!(line.is_image_only());
        assert!(!line.is_text_only());
    }

    #[test]
    fn test_mixed_line_is_neither() {
        let line = Line::new("A clearing.").with_image("forest.png");
        assert!(!line.is_text_only());
        assert!(!line.is_image_only());
    }

    #[test]
    fn test_line_serializes_as_text_and_image() {
        let line = Line::new("Hello").with_image("a.png");
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json, serde_json::json!({"text": "Hello", "image": "a.png"}));
    }

    #[test]
    fn test_line_missing_image_deserializes_empty() {
        let line: Line = serde_json::from_str(r#"{"text": "Hi"}"#).unwrap();
        assert_eq!(line.image, "");
    }

    #[test]
    fn test_line_display() {
        let line = Line::new("Dawn.\n").with_image("sun.png");
        assert_eq!(line.to_string(), "[sun.png] Dawn.");
    }
}
