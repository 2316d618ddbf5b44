//! One run of a pipeline over one input.
//!
//! An execution walks the handler list with a single cursor. Each handler
//! invocation ends in one of four ways:
//!
//! - it forwarded, and the next handler runs with the forwarded value
//!   (completion-style handlers never advance the chain)
//! - it completed, and the chain ends successfully
//! - it returned without signalling, and the chain ends successfully
//! - it failed or broke the signalling contract, and the chain ends with an
//!   error
//!
//! After the chain ends, cleanup callbacks run and every nested execution is
//! joined before the aggregated result is produced.

use super::{NestedExecution, Pipeline, PipelineError, PipelineResult};
use crate::context::{
    Completion, ExecutionContext, ExecutionInfo, ExecutionScope, Invocation, InvocationState,
    Notifier,
};
use crate::errors::{panic_message, ChainflowError, HandlerError, ProtocolViolation};
use crate::events::ExecutionEvent;
use crate::handlers::{Handler, Payload};
use crate::observability::SpanTimer;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

/// How one handler invocation ended.
enum Step<T, R> {
    /// Continue; `None` keeps the current value.
    Forward(Option<T>),
    Complete(Option<R>),
    Stop,
    Fail(HandlerError),
}

pub(crate) struct Execution<T, R, X> {
    scope: Arc<ExecutionScope<T, R, X>>,
}

impl<T, R, X> Execution<T, R, X>
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
            scope: Arc::new(ExecutionScope::new(pipeline, input, extra, info)),
        }
    }

    /// Runs the chain, then joins nested executions.
    ///
    /// Returns a boxed future so nested executions can be spawned as tasks.
    pub(crate) fn run(self) -> BoxFuture<'static, PipelineResult<T, R>> {
        let span = debug_span!(
            "execution",
            pipeline = %self.scope.pipeline.name(),
            execution_id = %self.scope.info.execution_id,
            depth = self.scope.info.depth,
        );

        async move {
            let timer = SpanTimer::start(self.scope.pipeline.name());
            let pipeline = &self.scope.pipeline;
            pipeline.record(&ExecutionEvent::Started {
                info: self.scope.info.clone(),
                pipeline: pipeline.name().to_string(),
            });

            let local = self.run_chain().await;

            let failures = self.scope.cleanup.run_all();
            if !failures.is_empty() {
                debug!(count = failures.len(), "Cleanup callbacks failed");
            }

            let nested = self.join_nested().await;
            let result = PipelineResult::aggregate(&self.scope.input, local, nested);

            let info = self.scope.info.clone();
            let elapsed = timer.finish();
            if result.ok {
                debug!(data_count = result.data.len(), "Execution completed");
                pipeline.record(&ExecutionEvent::Completed {
                    info,
                    duration_ms: elapsed,
                    data_count: result.data.len(),
                });
            } else {
                debug!(error_count = result.errors.len(), "Execution failed");
                pipeline.record(&ExecutionEvent::Failed {
                    info,
                    duration_ms: elapsed,
                    errors: result.messages().into_iter().map(String::from).collect(),
                });
            }

            result
        }
        .instrument(span)
        .boxed()
    }

    /// Walks the handler list until the chain ends.
    async fn run_chain(&self) -> Result<Option<R>, PipelineError<T>> {
        let handlers = Arc::clone(&self.scope.pipeline.handlers);
        let mut value = self.scope.input.clone();

        for (index, handler) in handlers.iter().enumerate() {
            debug!(index, handler = handler.name(), "Invoking handler");

            match self.invoke(handler, value.clone()).await {
                Step::Forward(Some(next)) => value = next,
                Step::Forward(None) => {}
                Step::Complete(data) => return Ok(data),
                Step::Stop => return Ok(None),
                Step::Fail(cause) => {
                    debug!(index, error = %cause, "Handler failed");
                    return Err(PipelineError::new(value, cause));
                }
            }
        }

        Ok(None)
    }

    async fn invoke(&self, handler: &Handler<T, R, X>, input: T) -> Step<T, R> {
        let invocation = Invocation::new();

        let outcome = match handler {
            Handler::Simple(handler) => {
                let handler = Arc::clone(handler);
                let ctx = ExecutionContext::new(Arc::clone(&self.scope), Arc::clone(&invocation), None);
                guarded(async move { handler.handle(input, ctx).await }).await
            }
            Handler::WithCompletion(handler) => {
                let handler = Arc::clone(handler);
                let (notifier, signalled) = Notifier::channel();
                let ctx = ExecutionContext::new(
                    Arc::clone(&self.scope),
                    Arc::clone(&invocation),
                    Some(Arc::downgrade(&notifier)),
                );
                let completion = Completion::new(
                    Arc::clone(&invocation),
                    notifier,
                    self.scope.info.execution_id,
                );

                let body = guarded(async move { handler.handle(input, ctx, completion).await }).await;
                if body.is_ok() {
                    // Closed when every completion handle is dropped unsignalled.
                    let _ = signalled.await;
                }
                body
            }
        };

        let state = invocation.seal();
        match (outcome, state) {
            (Err(cause), _) => Step::Fail(cause),
            (Ok(()), InvocationState::Violated(violation)) => {
                Step::Fail(ChainflowError::from(violation).into())
            }
            // Completion-style handlers always end the chain.
            (Ok(()), InvocationState::Forwarded(_)) if handler.is_completion_style() => {
                debug!(
                    handler = handler.name(),
                    "Forward from completion-style handler ends the chain"
                );
                Step::Stop
            }
            (Ok(()), InvocationState::Forwarded(next)) => Step::Forward(next),
            (Ok(()), InvocationState::Completed(data)) => Step::Complete(data),
            (Ok(()), InvocationState::Pending) if handler.is_completion_style() => {
                Step::Fail(ChainflowError::from(ProtocolViolation::CompletionDropped).into())
            }
            (Ok(()), InvocationState::Pending | InvocationState::Sealed) => Step::Stop,
        }
    }

    /// Joins nested executions, including any spawned while joining.
    async fn join_nested(&self) -> Vec<PipelineResult<T, R>> {
        let mut results = Vec::new();

        loop {
            let pending = self.scope.take_nested();
            if pending.is_empty() {
                break;
            }
            debug!(count = pending.len(), "Joining nested executions");
            results.extend(join_all(pending.into_iter().map(NestedExecution::join)).await);
        }

        results
    }
}

/// Awaits a handler body, turning a panic into an error.
async fn guarded<F>(body: F) -> Result<(), HandlerError>
where
    F: Future<Output = Result<(), HandlerError>>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ChainflowError::HandlerPanicked(panic_message(panic.as_ref())).into()),
    }
}
