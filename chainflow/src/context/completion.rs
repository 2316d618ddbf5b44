//! One-shot completion handle for completion-style handlers.

use super::{Invocation, Notifier};
use crate::errors::ProtocolViolation;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Ends a completion-style invocation and, with it, the execution's chain.
///
/// The handle may be cloned and moved into other tasks; the first signal
/// wins and any later signal is a protocol violation. If every clone is
/// dropped without signalling, the invocation fails.
pub struct Completion<T, R = ()> {
    invocation: Arc<Invocation<T, R>>,
    notifier: Arc<Notifier>,
    execution_id: Uuid,
}

impl<T, R> Completion<T, R> {
    pub(crate) fn new(
        invocation: Arc<Invocation<T, R>>,
        notifier: Arc<Notifier>,
        execution_id: Uuid,
    ) -> Self {
        Self {
            invocation,
            notifier,
            execution_id,
        }
    }

    /// Ends the chain and adds `value` to the execution's result data.
    pub fn complete(&self, value: R) -> Result<(), ProtocolViolation> {
        self.signal(Some(value))
    }

    /// Ends the chain without producing a value.
    pub fn done(&self) -> Result<(), ProtocolViolation> {
        self.signal(None)
    }

    fn signal(&self, value: Option<R>) -> Result<(), ProtocolViolation> {
        let result = self.invocation.complete(value);
        self.notifier.notify();
        if result == Err(ProtocolViolation::AfterTermination) {
            warn!(
                execution_id = %self.execution_id,
                "complete() called after the invocation ended; ignoring"
            );
        }
        result
    }
}

impl<T, R> Clone for Completion<T, R> {
    fn clone(&self) -> Self {
        Self {
            invocation: Arc::clone(&self.invocation),
            notifier: Arc::clone(&self.notifier),
            execution_id: self.execution_id,
        }
    }
}

impl<T, R> fmt::Debug for Completion<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("execution_id", &self.execution_id)
            .finish_non_exhaustive()
    }
}
