//! Story sessions - one reader, one story, one operation at a time.
//!
//! A session wraps a [`StoryController`] behind an async mutex. Reader actions
//! never queue: if an operation is already in flight, the next one fails
//! immediately with [`PlayerError::Busy`]. Loading holds the lock for its whole
//! duration, including the wait for the engine to open.

use std::sync::Arc;

use story_model::StoryEntry;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::config::PlayerConfig;
use crate::controller::{Phase, StoryController, StorySnapshot};
use crate::error::{PlayerError, Result};
use crate::events::EventBus;
use crate::provider::EngineProvider;

/// Serialized access to one story's controller.
pub struct StorySession {
    entry: StoryEntry,
    provider: Arc<dyn EngineProvider>,
    events: EventBus,
    controller: Mutex<StoryController>,
}

impl StorySession {
    /// Create a session for `entry`. Nothing is opened until [`load`](Self::load).
    pub fn new(entry: StoryEntry, config: PlayerConfig, provider: Arc<dyn EngineProvider>) -> Self {
        let events = EventBus::new();
        let controller = StoryController::new(entry.clone(), config).with_events(events.clone());
        Self {
            entry,
            provider,
            events,
            controller: Mutex::new(controller),
        }
    }

    pub fn entry(&self) -> &StoryEntry {
        &self.entry
    }

    /// Subscribe here to follow the story; no lock is needed.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Open the engine, restore any save, and advance to the first stop.
    ///
    /// Only the first load opens the engine; later calls do nothing, even
    /// when the first open failed.
    pub async fn load(&self) -> Result<()> {
        let mut controller = self.acquire()?;
        if controller.phase() != Phase::Loading {
            return Ok(());
        }
        debug!(story = %self.entry.id, "Opening engine");
        let opened = self.provider.open(&self.entry).await;
        controller.load(opened)
    }

    /// Take a choice.
    pub fn choose(&self, index: usize) -> Result<()> {
        self.acquire()?.choose(index)
    }

    /// Start over from the beginning.
    pub fn restart(&self) -> Result<()> {
        self.acquire()?.restart()
    }

    /// Offer the current choices again. Returns whether any are on offer.
    pub fn show_choices(&self) -> Result<bool> {
        Ok(self.acquire()?.show_choices())
    }

    /// Save progress, waiting for any in-flight operation to finish first.
    pub async fn close(&self) -> Result<()> {
        let controller = self.controller.lock().await;
        controller.save()
    }

    /// Current state, waiting for any in-flight operation to finish first.
    pub async fn snapshot(&self) -> StorySnapshot {
        self.controller.lock().await.snapshot()
    }

    fn acquire(&self) -> Result<MutexGuard<'_, StoryController>> {
        self.controller.try_lock().map_err(|_| {
            debug!(story = %self.entry.id, "Rejected overlapping operation");
            PlayerError::Busy
        })
    }
}

impl std::fmt::Debug for StorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorySession")
            .field("entry", &self.entry)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StoryEvent;
    use crate::testing::{lighthouse, lighthouse_entry, ScratchDir};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use story_model::{EngineError, StoryEngine};
    use tokio::sync::Notify;

    fn lighthouse_provider() -> Arc<dyn EngineProvider> {
        Arc::new(|_: &StoryEntry| -> std::result::Result<Box<dyn StoryEngine>, EngineError> {
            Ok(Box::new(lighthouse()))
        })
    }

    /// Holds `open` until released, announcing when it has started.
    #[derive(Default)]
    struct GatedProvider {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl EngineProvider for GatedProvider {
        async fn open(
            &self,
            _entry: &StoryEntry,
        ) -> std::result::Result<Box<dyn StoryEngine>, EngineError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(Box::new(lighthouse()))
        }
    }

    /// Fails every open, counting the attempts.
    #[derive(Default)]
    struct UnavailableProvider {
        opens: AtomicUsize,
    }

    #[async_trait]
    impl EngineProvider for UnavailableProvider {
        async fn open(
            &self,
            _entry: &StoryEntry,
        ) -> std::result::Result<Box<dyn StoryEngine>, EngineError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::Unavailable("no such story".into()))
        }
    }

    #[tokio::test]
    async fn test_load_and_play() {
        let dir = ScratchDir::new();
        let session = StorySession::new(lighthouse_entry(), dir.config(), lighthouse_provider());

        session.load().await.unwrap();
        assert_eq!(session.snapshot().await.phase, Phase::Choosing);

        session.choose(0).unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Complete);
        assert!(snapshot.is_complete);
        assert_eq!(snapshot.lines.len(), 4);
    }

    #[tokio::test]
    async fn test_operations_rejected_while_loading() {
        let dir = ScratchDir::new();
        let provider = Arc::new(GatedProvider::default());
        let session = Arc::new(StorySession::new(
            lighthouse_entry(),
            dir.config(),
            provider.clone(),
        ));

        let loader = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.load().await })
        };
        provider.started.notified().await;

        assert!(matches!(session.choose(0), Err(PlayerError::Busy)));
        assert!(matches!(session.restart(), Err(PlayerError::Busy)));
        assert!(matches!(session.show_choices(), Err(PlayerError::Busy)));
        assert!(matches!(session.load().await, Err(PlayerError::Busy)));

        provider.release.notify_one();
        loader.await.unwrap().unwrap();

        session.choose(1).unwrap();
        assert_eq!(session.snapshot().await.lines.len(), 4);
    }

    #[tokio::test]
    async fn test_close_persists_progress() {
        let dir = ScratchDir::new();
        let session = StorySession::new(lighthouse_entry(), dir.config(), lighthouse_provider());
        session.load().await.unwrap();
        session.choose(1).unwrap();
        session.close().await.unwrap();
        let before = session.snapshot().await;

        let reopened = StorySession::new(lighthouse_entry(), dir.config(), lighthouse_provider());
        reopened.load().await.unwrap();
        let after = reopened.snapshot().await;

        assert_eq!(after.lines, before.lines);
        assert_eq!(after.choices, before.choices);
    }

    #[tokio::test]
    async fn test_failed_open_completes_session() {
        let dir = ScratchDir::new();
        let provider: Arc<dyn EngineProvider> = Arc::new(
            |_: &StoryEntry| -> std::result::Result<Box<dyn StoryEngine>, EngineError> {
                Err(EngineError::Unavailable("no such story".into()))
            },
        );
        let session = StorySession::new(lighthouse_entry(), dir.config(), provider);

        session.load().await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Failed);
        assert!(snapshot.is_complete);
        assert_eq!(snapshot.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let dir = ScratchDir::new();
        let session = StorySession::new(lighthouse_entry(), dir.config(), lighthouse_provider());
        let lines = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        session.events().subscribe(move |event| {
            if let StoryEvent::LineAdded(line) = event {
                sink.lock().unwrap().push(line.text.clone());
            }
        });

        session.load().await.unwrap();
        session.restart().unwrap();

        assert_eq!(lines.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_second_load_is_noop() {
        let dir = ScratchDir::new();
        let session = StorySession::new(lighthouse_entry(), dir.config(), lighthouse_provider());
        session.load().await.unwrap();
        session.choose(1).unwrap();
        session.load().await.unwrap();
        assert_eq!(session.snapshot().await.lines.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_open_is_not_retried() {
        let dir = ScratchDir::new();
        let provider = Arc::new(UnavailableProvider::default());
        let session = StorySession::new(lighthouse_entry(), dir.config(), provider.clone());

        session.load().await.unwrap();
        session.load().await.unwrap();

        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Failed);
        assert_eq!(snapshot.lines.len(), 1);
    }
}
