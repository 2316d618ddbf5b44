//! Cleanup callbacks registered by handlers.
//!
//! Each execution owns one registry. Callbacks run once, in registration
//! order, when the execution's handler chain terminates and before its nested
//! executions are joined.

use crate::errors::panic_message;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// A callback for cleanup, with optional name.
struct CleanupCallback {
    callback: Box<dyn FnOnce() + Send>,
    name: Option<String>,
}

impl CleanupCallback {
    fn run(self) -> Result<(), CleanupFailure> {
        let name = self.name.unwrap_or_else(|| "<unnamed>".to_string());
        let callback = self.callback;

        catch_unwind(AssertUnwindSafe(callback)).map_err(|panic| {
            let message = format!("Cleanup callback panicked: {}", panic_message(panic.as_ref()));
            warn!(callback = %name, "{}", message);
            CleanupFailure { name, message }
        })
    }
}

/// A cleanup callback that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    /// The callback name, or `<unnamed>`.
    pub name: String,
    /// Description of the failure.
    pub message: String,
}

#[derive(Default)]
struct Callbacks {
    pending: Vec<CleanupCallback>,
    closed: bool,
}

/// Registry for cleanup callbacks executed in FIFO order.
#[derive(Default)]
pub struct CleanupRegistry {
    callbacks: Mutex<Callbacks>,
}

impl CleanupRegistry {
    /// Creates a new cleanup registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cleanup callback.
    ///
    /// If the registry has already run, the callback runs immediately.
    pub fn register<F>(&self, callback: F, name: Option<&str>)
    where
        F: FnOnce() + Send + 'static,
    {
        let entry = CleanupCallback {
            callback: Box::new(callback),
            name: name.map(String::from),
        };

        let late = {
            let mut callbacks = self.callbacks.lock();
            if callbacks.closed {
                Some(entry)
            } else {
                callbacks.pending.push(entry);
                None
            }
        };

        if let Some(entry) = late {
            debug!("Cleanup registered after execution ended; running immediately");
            let _ = entry.run();
        }
    }

    /// Runs all pending callbacks and closes the registry.
    ///
    /// Panics are caught and reported; they never stop later callbacks.
    pub fn run_all(&self) -> Vec<CleanupFailure> {
        let pending = {
            let mut callbacks = self.callbacks.lock();
            callbacks.closed = true;
            std::mem::take(&mut callbacks.pending)
        };

        pending
            .into_iter()
            .filter_map(|entry| entry.run().err())
            .collect()
    }

    /// Returns the number of pending cleanup callbacks.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.callbacks.lock().pending.len()
    }

    /// Returns true once `run_all` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.callbacks.lock().closed
    }
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("pending_count", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
