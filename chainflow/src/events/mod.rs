//! Lifecycle events emitted by executions.
//!
//! Every execution reports when it starts, spawns a child, and finishes.
//! Events go to the pipeline's [`EventSink`]; the default sink discards them.

mod lifecycle;
mod sink;

pub use lifecycle::ExecutionEvent;
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
