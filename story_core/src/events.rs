//! Story events - how a presentation layer learns that the story moved.
//!
//! The controller emits a [`StoryEvent`] for every observable change. Any
//! number of handlers may subscribe; each receives every event in emission
//! order, on the thread that performed the operation.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use story_model::{Choice, Line};
use uuid::Uuid;

use crate::controller::Phase;

/// An observable change to a story's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryEvent {
    /// A line was appended to the history.
    LineAdded(Line),

    /// A saved history of this many lines was restored.
    LinesRestored(usize),

    /// The history was emptied by a restart.
    LinesCleared,

    /// The choices on offer changed.
    ChoicesChanged(Vec<Choice>),

    /// The controller moved to a new phase.
    PhaseChanged(Phase),

    /// Progress was written to disk.
    Saved,

    /// The save files were deleted.
    SaveCleared,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type Handler = Arc<dyn Fn(&StoryEvent) + Send + Sync>;

/// Fan-out of story events to subscribed handlers.
///
/// Cloning a bus yields another handle onto the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<Vec<(SubscriptionId, Handler)>>>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for all subsequent events.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StoryEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Handlers run outside the subscriber lock and may subscribe or
    /// unsubscribe; such changes apply from the next event.
    pub fn emit(&self, event: &StoryEvent) {
        let handlers: Vec<Handler> = self.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Handler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
