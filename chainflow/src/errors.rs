//! Error types for the chainflow engine.
//!
//! Handlers fail with an opaque [`HandlerError`]; the engine's own failures
//! (protocol violations, panics, depth limits) are typed as
//! [`ChainflowError`] and carried as the cause of a
//! [`PipelineError`](crate::pipeline::PipelineError).

use std::any::Any;
use thiserror::Error;

/// The error type handlers return.
///
/// Any error can be propagated into it with `?`, and the original value is
/// preserved as the cause of the resulting pipeline error.
pub type HandlerError = anyhow::Error;

/// A breach of the handler contract.
///
/// A handler may signal its invocation at most once, either by forwarding or
/// by completing. Every other sequence is a violation and fails the
/// execution exactly as if the handler had returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// `forward` was called twice in one invocation.
    #[error("forward() called twice")]
    DoubleForward,

    /// The completion handle was signalled twice.
    #[error("complete() called twice")]
    DoubleComplete,

    /// `forward` was called after the invocation was completed.
    #[error("forward() called after complete()")]
    ForwardAfterComplete,

    /// The invocation was completed after `forward` was called.
    #[error("complete() called after forward()")]
    CompleteAfterForward,

    /// A signal arrived after the invocation had already ended.
    #[error("handler signalled after its invocation ended")]
    AfterTermination,

    /// Every completion handle was dropped without being signalled.
    #[error("completion handle dropped without being signalled")]
    CompletionDropped,
}

/// Errors raised by the engine itself.
#[derive(Debug, Error)]
pub enum ChainflowError {
    /// A handler broke the forward/complete contract.
    #[error("{0}")]
    Protocol(#[from] ProtocolViolation),

    /// A handler panicked while running.
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    /// A nested execution task could not be joined.
    #[error("Nested execution could not be joined: {0}")]
    NestedJoin(String),

    /// A nested execution was spawned outside a tokio runtime.
    #[error("Nested executions must be spawned inside a tokio runtime")]
    NoRuntime,

    /// A spawn would exceed the configured nesting depth.
    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    DepthExceeded {
        /// The configured limit.
        max_depth: u32,
    },

    /// The pipeline configuration is invalid.
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChainflowError {
    /// Returns the protocol violation, if this is one.
    #[must_use]
    pub fn protocol_violation(&self) -> Option<ProtocolViolation> {
        match self {
            Self::Protocol(violation) => Some(*violation),
            _ => None,
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
