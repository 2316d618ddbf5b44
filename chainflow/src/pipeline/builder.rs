//! Fluent pipeline builder.

use super::{Pipeline, PipelineConfig};
use crate::context::{Completion, ExecutionContext};
use crate::errors::{ChainflowError, HandlerError};
use crate::events::{EventSink, NoOpEventSink};
use crate::handlers::{Handler, Payload};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Handlers run in the order they are added.
pub struct PipelineBuilder<T, R = (), X = ()> {
    config: PipelineConfig,
    handlers: Vec<Handler<T, R, X>>,
    events: Option<Arc<dyn EventSink>>,
}

impl<T, R, X> PipelineBuilder<T, R, X>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: PipelineConfig::new(name),
            handlers: Vec::new(),
            events: None,
        }
    }

    /// Appends a handler.
    #[must_use]
    pub fn handler(mut self, handler: Handler<T, R, X>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Appends several handlers, keeping their order.
    #[must_use]
    pub fn handlers(mut self, handlers: impl IntoIterator<Item = Handler<T, R, X>>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Appends an async closure as a simple handler.
    #[must_use]
    pub fn simple<F, Fut>(self, func: F) -> Self
    where
        F: Fn(T, ExecutionContext<T, R, X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.handler(Handler::simple(func))
    }

    /// Appends an async closure as a completion-style handler.
    #[must_use]
    pub fn with_completion<F, Fut>(self, func: F) -> Self
    where
        F: Fn(T, ExecutionContext<T, R, X>, Completion<T, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.handler(Handler::with_completion(func))
    }

    /// Replaces the whole configuration, name included.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Limits how deeply executions may nest.
    #[must_use]
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    /// Enables or disables lifecycle events.
    #[must_use]
    pub fn emit_events(mut self, emit_events: bool) -> Self {
        self.config.emit_events = emit_events;
        self
    }

    /// Sets the sink that receives lifecycle events.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the number of handlers added so far.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline<T, R, X>, ChainflowError> {
        self.config.validate()?;
        let events = self.events.unwrap_or_else(|| Arc::new(NoOpEventSink));
        Ok(Pipeline::from_parts(self.handlers, self.config, events))
    }
}

impl<T, R, X> fmt::Debug for PipelineBuilder<T, R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough() -> Handler<u32> {
        Handler::simple(|_: u32, ctx: ExecutionContext<u32>| async move {
            ctx.forward_same()?;
            anyhow::Ok(())
        })
    }

    #[test]
    fn test_builder_keeps_order_and_name() {
        let builder = PipelineBuilder::<u32>::new("import")
            .handler(passthrough())
            .handlers(vec![passthrough(), passthrough()]);

        assert_eq!(builder.name(), "import");
        assert_eq!(builder.handler_count(), 3);

        let pipeline = builder.build().unwrap();
        assert_eq!(pipeline.name(), "import");
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn test_builder_config() {
        let pipeline = PipelineBuilder::<u32>::new("scan")
            .max_depth(4)
            .emit_events(false)
            .build()
            .unwrap();

        assert_eq!(pipeline.config().max_depth, Some(4));
        assert!(!pipeline.config().emit_events);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_builder_rejects_empty_name() {
        let err = PipelineBuilder::<u32>::new("").build().unwrap_err();
        assert!(matches!(err, ChainflowError::Config(_)));
    }

    #[test]
    fn test_config_replaces_name() {
        let pipeline = PipelineBuilder::<u32>::new("first")
            .config(PipelineConfig::new("second"))
            .build()
            .unwrap();
        assert_eq!(pipeline.name(), "second");
    }
}
