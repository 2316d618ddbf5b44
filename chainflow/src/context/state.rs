//! Per-invocation signal state.

use crate::errors::ProtocolViolation;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Where one handler invocation stands.
///
/// The first signal moves the state out of `Pending`. Any further signal is a
/// violation, and once the engine seals the invocation every signal is
/// rejected.
#[derive(Debug)]
pub(crate) enum InvocationState<T, R> {
    Pending,
    /// `None` passes the invocation's input through unchanged.
    Forwarded(Option<T>),
    Completed(Option<R>),
    Violated(ProtocolViolation),
    Sealed,
}

impl<T, R> InvocationState<T, R> {
    fn forward(&mut self, output: Option<T>) -> Result<(), ProtocolViolation> {
        let violation = match *self {
            Self::Pending => {
                *self = Self::Forwarded(output);
                return Ok(());
            }
            Self::Forwarded(_) => ProtocolViolation::DoubleForward,
            Self::Completed(_) => ProtocolViolation::ForwardAfterComplete,
            Self::Violated(first) => return Err(first),
            Self::Sealed => return Err(ProtocolViolation::AfterTermination),
        };
        *self = Self::Violated(violation);
        Err(violation)
    }

    fn complete(&mut self, value: Option<R>) -> Result<(), ProtocolViolation> {
        let violation = match *self {
            Self::Pending => {
                *self = Self::Completed(value);
                return Ok(());
            }
            Self::Forwarded(_) => ProtocolViolation::CompleteAfterForward,
            Self::Completed(_) => ProtocolViolation::DoubleComplete,
            Self::Violated(first) => return Err(first),
            Self::Sealed => return Err(ProtocolViolation::AfterTermination),
        };
        *self = Self::Violated(violation);
        Err(violation)
    }
}

/// Shared state of one handler invocation.
#[derive(Debug)]
pub(crate) struct Invocation<T, R> {
    state: Mutex<InvocationState<T, R>>,
}

impl<T, R> Invocation<T, R> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(InvocationState::Pending),
        })
    }

    pub(crate) fn forward(&self, output: Option<T>) -> Result<(), ProtocolViolation> {
        self.state.lock().forward(output)
    }

    pub(crate) fn complete(&self, value: Option<R>) -> Result<(), ProtocolViolation> {
        self.state.lock().complete(value)
    }

    /// Ends the invocation and returns the state it reached.
    pub(crate) fn seal(&self) -> InvocationState<T, R> {
        std::mem::replace(&mut *self.state.lock(), InvocationState::Sealed)
    }
}

/// Wakes an engine waiting on a completion-style invocation.
///
/// Only completion handles hold it strongly, so the receiver observes a
/// closed channel once every handle is gone.
#[derive(Debug)]
pub(crate) struct Notifier {
    sender: Mutex<Option<oneshot::Sender<()>>>,
}

impl Notifier {
    pub(crate) fn channel() -> (Arc<Self>, oneshot::Receiver<()>) {
        let (sender, receiver) = oneshot::channel();
        let notifier = Arc::new(Self {
            sender: Mutex::new(Some(sender)),
        });
        (notifier, receiver)
    }

    pub(crate) fn notify(&self) {
        if let Some(sender) = self.sender.lock().take() {
            let _ = sender.send(());
        }
    }
}
