//! The pipeline type and its public execution API.

use super::execution::Execution;
use super::{NestedExecution, PipelineBuilder, PipelineConfig, PipelineError, PipelineResult};
use crate::context::ExecutionInfo;
use crate::errors::ChainflowError;
use crate::events::{EventSink, ExecutionEvent, NoOpEventSink};
use crate::handlers::{Handler, Payload};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// An ordered, immutable chain of handlers.
///
/// Cloning a pipeline is cheap: clones share the handler list, and every
/// nested execution runs against the same list.
pub struct Pipeline<T, R = (), X = ()> {
    pub(crate) handlers: Arc<[Handler<T, R, X>]>,
    config: Arc<PipelineConfig>,
    events: Arc<dyn EventSink>,
}

impl<T, R, X> Pipeline<T, R, X>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    /// Creates a pipeline from handlers, in execution order.
    pub fn new(handlers: impl IntoIterator<Item = Handler<T, R, X>>) -> Self {
        Self::from_parts(
            handlers.into_iter().collect(),
            PipelineConfig::default(),
            Arc::new(NoOpEventSink),
        )
    }

    /// Starts a fluent builder.
    pub fn builder(name: impl Into<String>) -> PipelineBuilder<T, R, X> {
        PipelineBuilder::new(name)
    }

    pub(crate) fn from_parts(
        handlers: Vec<Handler<T, R, X>>,
        config: PipelineConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            handlers: handlers.into(),
            config: Arc::new(config),
            events,
        }
    }

    /// Runs `input` through the pipeline.
    ///
    /// Resolves once this execution and every nested execution it spawned
    /// have finished. Failures are reported in the result, never raised.
    ///
    /// Nested executions run as tokio tasks, so a pipeline whose handlers
    /// spawn must be executed inside a tokio runtime. Elsewhere each spawn
    /// yields a failed nested result with [`ChainflowError::NoRuntime`].
    pub async fn execute(&self, input: T) -> PipelineResult<T, R> {
        self.run_root(input, None).await
    }

    /// Runs `input` with an extra context value visible to every handler.
    ///
    /// Nested executions inherit `extra` unless they are spawned with
    /// [`spawn_with`](crate::context::ExecutionContext::spawn_with).
    pub async fn execute_with(&self, input: T, extra: X) -> PipelineResult<T, R> {
        self.run_root(input, Some(extra)).await
    }

    async fn run_root(&self, input: T, extra: Option<X>) -> PipelineResult<T, R> {
        Execution::new(self.clone(), input, extra, ExecutionInfo::root())
            .run()
            .await
    }

    /// Starts an execution spawned by the execution `parent`.
    pub(crate) fn start_nested(
        &self,
        input: T,
        extra: Option<X>,
        parent: &ExecutionInfo,
    ) -> NestedExecution<T, R> {
        let info = parent.child();

        if !self.config.allows_depth(info.depth) {
            let max_depth = self.config.max_depth.unwrap_or_default();
            debug!(
                execution_id = %parent.execution_id,
                max_depth,
                "Rejecting spawn beyond maximum depth"
            );
            self.record(&ExecutionEvent::SpawnRejected {
                parent: parent.clone(),
                max_depth,
            });
            let error = PipelineError::new(input, ChainflowError::DepthExceeded { max_depth });
            return NestedExecution::ready(info.execution_id, PipelineResult::failure(error));
        }

        if tokio::runtime::Handle::try_current().is_err() {
            warn!(execution_id = %parent.execution_id, "Spawn outside a tokio runtime");
            let error = PipelineError::new(input, ChainflowError::NoRuntime);
            return NestedExecution::ready(info.execution_id, PipelineResult::failure(error));
        }

        self.record(&ExecutionEvent::Spawned {
            parent: parent.clone(),
            child_id: info.execution_id,
        });

        let execution_id = info.execution_id;
        let execution = Execution::new(self.clone(), input.clone(), extra, info).run();
        NestedExecution::spawn(execution_id, input, execution)
    }

    /// Sends a lifecycle event to the sink if events are enabled.
    pub(crate) fn record(&self, event: &ExecutionEvent) {
        if self.config.emit_events {
            self.events.record(event);
        }
    }
}

impl<T, R, X> Pipeline<T, R, X> {
    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the handlers in execution order.
    #[must_use]
    pub fn handlers(&self) -> &[Handler<T, R, X>] {
        &self.handlers
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the pipeline has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T, R, X> Clone for Pipeline<T, R, X> {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            config: Arc::clone(&self.config),
            events: Arc::clone(&self.events),
        }
    }
}

impl<T, R, X> fmt::Debug for Pipeline<T, R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("handlers", &self.handlers)
            .field("max_depth", &self.config.max_depth)
            .finish_non_exhaustive()
    }
}
