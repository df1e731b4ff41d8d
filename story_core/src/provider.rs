//! Engine providers - where engines for story entries come from.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use story_model::{EngineError, ScriptedStory, StoryEngine, StoryEntry};
use tracing::debug;

/// Opens a fresh engine for a story entry.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    async fn open(&self, entry: &StoryEntry) -> Result<Box<dyn StoryEngine>, EngineError>;
}

/// Any synchronous opener closure is a provider.
#[async_trait]
impl<F> EngineProvider for F
where
    F: Fn(&StoryEntry) -> Result<Box<dyn StoryEngine>, EngineError> + Send + Sync,
{
    async fn open(&self, entry: &StoryEntry) -> Result<Box<dyn StoryEngine>, EngineError> {
        (self)(entry)
    }
}

/// Opens [`ScriptedStory`] files from disk.
///
/// Relative story paths are resolved against the provider's root, if it has one.
#[derive(Debug, Clone, Default)]
pub struct FileEngineProvider {
    root: Option<PathBuf>,
}

impl FileEngineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative story files against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, story_file: &Path) -> PathBuf {
        match &self.root {
            Some(root) if story_file.is_relative() => root.join(story_file),
            _ => story_file.to_path_buf(),
        }
    }
}

#[async_trait]
impl EngineProvider for FileEngineProvider {
    async fn open(&self, entry: &StoryEntry) -> Result<Box<dyn StoryEngine>, EngineError> {
        let path = self.resolve(&entry.story_file);
        debug!(story = %entry.id, path = %path.display(), "Opening story file");

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let story = ScriptedStory::from_source(&path, &source)?;
        Ok(Box::new(story))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScratchDir, LIGHTHOUSE};

    #[tokio::test]
    async fn test_opens_toml_story() {
        let dir = ScratchDir::new();
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("lighthouse.toml"), LIGHTHOUSE).unwrap();

        let provider = FileEngineProvider::with_root(dir.path());
        let mut engine = provider.open(&StoryEntry::new("lighthouse.toml")).await.unwrap();

        assert!(engine.can_continue());
        assert_eq!(engine.continue_story().unwrap(), "Waves break against the rocks.\n");
    }

    #[tokio::test]
    async fn test_bundled_story_opens() {
        let provider = FileEngineProvider::with_root(env!("CARGO_MANIFEST_DIR"));
        let mut engine = provider
            .open(&StoryEntry::new("stories/lighthouse.toml"))
            .await
            .unwrap();

        while engine.can_continue() {
            engine.continue_story().unwrap();
        }
        assert_eq!(engine.current_choices().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = ScratchDir::new();
        let provider = FileEngineProvider::new();
        let entry = StoryEntry::new(dir.path().join("nothing.json"));

        let result = provider.open(&entry).await;
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_script_is_reported() {
        let dir = ScratchDir::new();
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"start": "a", "knots": {}}"#).unwrap();

        let provider = FileEngineProvider::with_root(dir.path());
        let result = provider.open(&StoryEntry::new("broken.json")).await;
        assert!(matches!(result, Err(EngineError::Script(_))));
    }

    #[tokio::test]
    async fn test_closure_provider() {
        let provider = |_: &StoryEntry| -> Result<Box<dyn StoryEngine>, EngineError> {
            Err(EngineError::Unavailable("offline".into()))
        };
        let result = provider.open(&StoryEntry::new("x.json")).await;
        assert!(result.is_err());
    }
}
