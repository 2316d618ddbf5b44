//! Handles to nested executions.

use super::{PipelineError, PipelineResult};
use crate::errors::ChainflowError;
use crate::handlers::Payload;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use uuid::Uuid;

/// A nested execution started with
/// [`ExecutionContext::spawn`](crate::context::ExecutionContext::spawn).
///
/// Awaiting it yields the nested execution's aggregated result. The spawning
/// execution holds its own handle, so dropping this one never loses the
/// result.
pub struct NestedExecution<T, R = ()> {
    execution_id: Uuid,
    result: Shared<BoxFuture<'static, Arc<PipelineResult<T, R>>>>,
}

impl<T, R> NestedExecution<T, R>
where
    T: Payload,
    R: Payload,
{
    /// Runs `execution` as a tokio task.
    pub(crate) fn spawn(
        execution_id: Uuid,
        input: T,
        execution: BoxFuture<'static, PipelineResult<T, R>>,
    ) -> Self {
        let handle = tokio::spawn(execution);
        let result = async move {
            let result = handle.await.unwrap_or_else(|err| {
                PipelineResult::failure(PipelineError::new(
                    input,
                    ChainflowError::NestedJoin(err.to_string()),
                ))
            });
            Arc::new(result)
        };

        Self {
            execution_id,
            result: result.boxed().shared(),
        }
    }

    /// Wraps a result that is already known.
    pub(crate) fn ready(execution_id: Uuid, result: PipelineResult<T, R>) -> Self {
        Self {
            execution_id,
            result: futures::future::ready(Arc::new(result)).boxed().shared(),
        }
    }

    /// Returns the ID of the nested execution.
    #[must_use]
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Waits for the result and takes it out of the shared handle.
    pub(crate) async fn join(self) -> PipelineResult<T, R> {
        let shared = self.await;
        Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<T, R> Future for NestedExecution<T, R>
where
    T: Payload,
    R: Payload,
{
    type Output = Arc<PipelineResult<T, R>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().result.poll_unpin(cx)
    }
}

impl<T, R> Clone for NestedExecution<T, R> {
    fn clone(&self) -> Self {
        Self {
            execution_id: self.execution_id,
            result: self.result.clone(),
        }
    }
}

impl<T, R> fmt::Debug for NestedExecution<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedExecution")
            .field("execution_id", &self.execution_id)
            .field("finished", &self.result.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_result() {
        let nested = NestedExecution::<u32>::ready(Uuid::new_v4(), PipelineResult::success(vec![]));
        assert!(format!("{nested:?}").contains("finished: false"));

        let result = tokio_test::block_on(nested.join());
        assert!(result.ok);
    }

    #[tokio::test]
    async fn test_clones_share_result() {
        let id = Uuid::new_v4();
        let execution = async { PipelineResult::<u32, u32>::success(vec![7]) }.boxed();
        let nested = NestedExecution::spawn(id, 1, execution);
        let observer = nested.clone();

        assert_eq!(observer.await.data, vec![7]);
        assert_eq!(nested.execution_id(), id);
        assert_eq!(nested.join().await.data, vec![7]);
    }

    #[tokio::test]
    async fn test_panicked_task_becomes_failure() {
        let execution = async {
            if true {
                panic!("task died");
            }
            PipelineResult::<u32>::success(vec![])
        }
        .boxed();

        let result = NestedExecution::spawn(Uuid::new_v4(), 3, execution).join().await;

        assert!(!result.ok);
        assert_eq!(result.errors[0].input_path_trace, vec![3]);
        assert!(matches!(
            result.errors[0].downcast_cause::<ChainflowError>(),
            Some(ChainflowError::NestedJoin(_))
        ));
    }
}
