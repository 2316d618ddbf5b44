//! Mock handlers for tests.

use crate::context::ExecutionContext;
use crate::errors::HandlerError;
use crate::handlers::{Handler, Payload, SimpleHandler};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// A handler that records each input and forwards it unchanged.
#[derive(Debug)]
pub struct RecordingHandler<T> {
    name: String,
    inputs: Mutex<Vec<T>>,
}

impl<T: Payload> RecordingHandler<T> {
    /// Creates a new recording handler.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inputs: Mutex::new(Vec::new()),
        })
    }

    /// Returns every recorded input, in invocation order.
    #[must_use]
    pub fn inputs(&self) -> Vec<T> {
        self.inputs.lock().clone()
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Wraps a shared recorder as a pipeline handler.
    #[must_use]
    pub fn handler<R: Payload, X: Payload>(self: Arc<Self>) -> Handler<T, R, X> {
        Handler::Simple(self)
    }
}

#[async_trait]
impl<T, R, X> SimpleHandler<T, R, X> for RecordingHandler<T>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, input: T, ctx: ExecutionContext<T, R, X>) -> Result<(), HandlerError> {
        self.inputs.lock().push(input);
        ctx.forward_same()?;
        Ok(())
    }
}

/// A handler that always fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Creates a handler failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps this as a pipeline handler.
    #[must_use]
    pub fn handler<T: Payload, R: Payload, X: Payload>(self) -> Handler<T, R, X> {
        Handler::Simple(Arc::new(self))
    }
}

#[async_trait]
impl<T, R, X> SimpleHandler<T, R, X> for FailingHandler
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    fn name(&self) -> &str {
        "failing"
    }

    async fn handle(&self, _input: T, _ctx: ExecutionContext<T, R, X>) -> Result<(), HandlerError> {
        Err(anyhow::anyhow!(self.message.clone()))
    }
}
