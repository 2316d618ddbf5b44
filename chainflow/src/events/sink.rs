//! Destinations for lifecycle events.

use super::ExecutionEvent;
use parking_lot::RwLock;
use tracing::Level;

/// Receives the lifecycle events of every execution of a pipeline.
///
/// `record` is called inline on the execution's task, so implementations
/// must return quickly and must not panic.
pub trait EventSink: Send + Sync {
    /// Handles one event.
    fn record(&self, event: &ExecutionEvent);
}

/// Discards every event. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn record(&self, _event: &ExecutionEvent) {}
}

/// Writes events to `tracing` at a fixed level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a sink logging at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Returns the level events are logged at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl EventSink for LoggingEventSink {
    fn record(&self, event: &ExecutionEvent) {
        let name = event.name();
        let payload = event.payload();
        // `tracing` macros need the level as a constant.
        if self.level == Level::ERROR {
            tracing::error!(event = name, %payload, "Lifecycle event");
        } else if self.level == Level::WARN {
            tracing::warn!(event = name, %payload, "Lifecycle event");
        } else if self.level == Level::INFO {
            tracing::info!(event = name, %payload, "Lifecycle event");
        } else if self.level == Level::DEBUG {
            tracing::debug!(event = name, %payload, "Lifecycle event");
        } else {
            tracing::trace!(event = name, %payload, "Lifecycle event");
        }
    }
}

/// Keeps every event in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<ExecutionEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events seen so far, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.read().clone()
    }

    /// Returns the number of events seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no event arrived yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Forgets every event.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Counts events whose [`name`](ExecutionEvent::name) is `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events.read().iter().filter(|e| e.name() == name).count()
    }

    /// Returns the error lists of every `Failed` event.
    #[must_use]
    pub fn failures(&self) -> Vec<Vec<String>> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                ExecutionEvent::Failed { errors, .. } => Some(errors.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn record(&self, event: &ExecutionEvent) {
        self.events.write().push(event.clone());
    }
}
