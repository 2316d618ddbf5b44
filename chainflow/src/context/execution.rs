//! Execution context handed to handlers.

use super::{ExecutionInfo, Invocation, Notifier};
use crate::cleanup::CleanupRegistry;
use crate::errors::ProtocolViolation;
use crate::handlers::Payload;
use crate::pipeline::{NestedExecution, Pipeline};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::warn;
use uuid::Uuid;

/// State shared by every invocation of one execution.
pub(crate) struct ExecutionScope<T, R, X> {
    pub(crate) pipeline: Pipeline<T, R, X>,
    pub(crate) input: T,
    pub(crate) extra: Option<X>,
    pub(crate) info: ExecutionInfo,
    pub(crate) cleanup: CleanupRegistry,
    nested: Mutex<NestedSet<T, R>>,
}

/// Nested executions awaiting the final join.
struct NestedSet<T, R> {
    pending: Vec<NestedExecution<T, R>>,
    /// Set once a drain finds nothing pending; later spawns are not joined.
    joined: bool,
}

impl<T, R, X> ExecutionScope<T, R, X>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    pub(crate) fn new(
        pipeline: Pipeline<T, R, X>,
        input: T,
        extra: Option<X>,
        info: ExecutionInfo,
    ) -> Self {
        Self {
            pipeline,
            input,
            extra,
            info,
            cleanup: CleanupRegistry::new(),
            nested: Mutex::new(NestedSet {
                pending: Vec::new(),
                joined: false,
            }),
        }
    }

    /// Starts a nested execution and tracks it for the final join.
    pub(crate) fn spawn(&self, input: T, extra: Option<X>) -> NestedExecution<T, R> {
        let nested = self.pipeline.start_nested(input, extra, &self.info);
        let mut set = self.nested.lock();
        if set.joined {
            warn!(
                execution_id = %self.info.execution_id,
                "Spawn after the execution was joined; its result will not be aggregated"
            );
        } else {
            set.pending.push(nested.clone());
        }
        nested
    }

    /// Takes every nested execution spawned since the last call.
    ///
    /// Finding none closes the set: the execution counts as joined, and
    /// spawns from then on are only logged.
    pub(crate) fn take_nested(&self) -> Vec<NestedExecution<T, R>> {
        let mut set = self.nested.lock();
        if set.pending.is_empty() {
            set.joined = true;
        }
        std::mem::take(&mut set.pending)
    }

    #[cfg(test)]
    pub(crate) fn is_joined(&self) -> bool {
        self.nested.lock().joined
    }
}

/// The capability object passed to each handler invocation.
///
/// Cloning is cheap. Clones refer to the same invocation, so a handler can
/// move one into a detached task and signal from there.
pub struct ExecutionContext<T, R = (), X = ()> {
    scope: Arc<ExecutionScope<T, R, X>>,
    invocation: Arc<Invocation<T, R>>,
    notifier: Option<Weak<Notifier>>,
}

impl<T, R, X> ExecutionContext<T, R, X>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    pub(crate) fn new(
        scope: Arc<ExecutionScope<T, R, X>>,
        invocation: Arc<Invocation<T, R>>,
        notifier: Option<Weak<Notifier>>,
    ) -> Self {
        Self {
            scope,
            invocation,
            notifier,
        }
    }

    /// Continues the chain with `output` as the next handler's input.
    ///
    /// May be called once per invocation. The next handler starts after this
    /// invocation ends.
    pub fn forward(&self, output: T) -> Result<(), ProtocolViolation> {
        self.signal_forward(Some(output))
    }

    /// Continues the chain with this invocation's input unchanged.
    pub fn forward_same(&self) -> Result<(), ProtocolViolation> {
        self.signal_forward(None)
    }

    fn signal_forward(&self, output: Option<T>) -> Result<(), ProtocolViolation> {
        let result = self.invocation.forward(output);
        if let Some(notifier) = self.notifier.as_ref().and_then(Weak::upgrade) {
            notifier.notify();
        }
        if result == Err(ProtocolViolation::AfterTermination) {
            warn!(
                execution_id = %self.scope.info.execution_id,
                "forward() called after the invocation ended; ignoring"
            );
        }
        result
    }

    /// Starts a nested execution of the same pipeline over `input`.
    ///
    /// The nested execution inherits this execution's extra context and
    /// starts immediately. The returned handle may be awaited or dropped;
    /// either way its result is folded into this execution's result.
    pub fn spawn(&self, input: T) -> NestedExecution<T, R> {
        self.scope.spawn(input, self.scope.extra.clone())
    }

    /// Like [`spawn`](Self::spawn), with `extra` replacing the inherited
    /// extra context.
    pub fn spawn_with(&self, input: T, extra: X) -> NestedExecution<T, R> {
        self.scope.spawn(input, Some(extra))
    }

    /// Returns the extra context of this execution, if any.
    #[must_use]
    pub fn extra(&self) -> Option<&X> {
        self.scope.extra.as_ref()
    }

    /// Returns the input this execution started with.
    #[must_use]
    pub fn execution_input(&self) -> &T {
        &self.scope.input
    }

    /// Registers a callback to run when this execution's chain ends.
    pub fn on_cleanup<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.scope.cleanup.register(callback, None);
    }

    /// Registers a named cleanup callback.
    pub fn on_cleanup_named<F>(&self, name: &str, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.scope.cleanup.register(callback, Some(name));
    }

    /// Returns the identity of this execution.
    #[must_use]
    pub fn info(&self) -> &ExecutionInfo {
        &self.scope.info
    }

    /// Returns this execution's ID.
    #[must_use]
    pub fn execution_id(&self) -> Uuid {
        self.scope.info.execution_id
    }

    /// Returns the nesting depth of this execution.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.scope.info.depth
    }
}

impl<T, R, X> Clone for ExecutionContext<T, R, X> {
    fn clone(&self) -> Self {
        Self {
            scope: Arc::clone(&self.scope),
            invocation: Arc::clone(&self.invocation),
            notifier: self.notifier.clone(),
        }
    }
}

impl<T, R, X> fmt::Debug for ExecutionContext<T, R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.scope.info.execution_id)
            .field("depth", &self.scope.info.depth)
            .field("completion_style", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}
