//! Handler traits and implementations.
//!
//! Handlers are the stages of a pipeline. Each one is registered as either a
//! [`Handler::Simple`] handler, whose invocation ends when its body returns,
//! or a [`Handler::WithCompletion`] handler, whose invocation ends when it
//! signals its [`Completion`] handle.

mod function;

pub use function::{FnCompletionHandler, FnHandler};

use crate::context::{Completion, ExecutionContext};
use crate::errors::HandlerError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;

/// Values that can flow through a pipeline.
///
/// Inputs, result values and extra context are cloned into error traces and
/// shared across concurrently running executions.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Send + Sync + 'static {}

/// A handler whose invocation ends when its body returns.
///
/// If the body called [`ExecutionContext::forward`], the next handler runs.
/// Otherwise the execution ends successfully.
#[async_trait]
pub trait SimpleHandler<T, R = (), X = ()>: Send + Sync {
    /// Returns the handler name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handles one input value.
    async fn handle(&self, input: T, ctx: ExecutionContext<T, R, X>) -> Result<(), HandlerError>;
}

/// A handler whose invocation ends when it signals completion.
///
/// The engine waits for the [`Completion`] handle after the body returns, so
/// the signal may come from work the body left running.
#[async_trait]
pub trait CompletionHandler<T, R = (), X = ()>: Send + Sync {
    /// Returns the handler name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handles one input value.
    async fn handle(
        &self,
        input: T,
        ctx: ExecutionContext<T, R, X>,
        completion: Completion<T, R>,
    ) -> Result<(), HandlerError>;
}

/// One stage of a pipeline, tagged with how its invocation ends.
pub enum Handler<T, R = (), X = ()> {
    /// Ends when the body returns.
    Simple(Arc<dyn SimpleHandler<T, R, X>>),
    /// Ends when the completion handle is signalled.
    WithCompletion(Arc<dyn CompletionHandler<T, R, X>>),
}

impl<T, R, X> Handler<T, R, X>
where
    T: Payload,
    R: Payload,
    X: Payload,
{
    /// Wraps an async closure as a simple handler.
    pub fn simple<F, Fut>(func: F) -> Self
    where
        F: Fn(T, ExecutionContext<T, R, X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::Simple(Arc::new(FnHandler::new(func)))
    }

    /// Wraps an async closure as a completion-style handler.
    pub fn with_completion<F, Fut>(func: F) -> Self
    where
        F: Fn(T, ExecutionContext<T, R, X>, Completion<T, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::WithCompletion(Arc::new(FnCompletionHandler::new(func)))
    }
}

impl<T, R, X> Handler<T, R, X> {
    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(handler) => handler.name(),
            Self::WithCompletion(handler) => handler.name(),
        }
    }

    /// Returns true for completion-style handlers.
    #[must_use]
    pub fn is_completion_style(&self) -> bool {
        matches!(self, Self::WithCompletion(_))
    }
}

impl<T, R, X> Clone for Handler<T, R, X> {
    fn clone(&self) -> Self {
        match self {
            Self::Simple(handler) => Self::Simple(Arc::clone(handler)),
            Self::WithCompletion(handler) => Self::WithCompletion(Arc::clone(handler)),
        }
    }
}

impl<T, R, X> Debug for Handler<T, R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_completion_style() { "WithCompletion" } else { "Simple" };
        f.debug_struct("Handler")
            .field("kind", &kind)
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named;

    #[async_trait]
    impl SimpleHandler<u32> for Named {
        fn name(&self) -> &str {
            "named"
        }

        async fn handle(&self, input: u32, ctx: ExecutionContext<u32>) -> Result<(), HandlerError> {
            ctx.forward(input * 2)?;
            Ok(())
        }
    }

    #[test]
    fn test_handler_kinds() {
        let simple: Handler<u32> = Handler::simple(|_: u32, _: ExecutionContext<u32>| async {
            anyhow::Ok(())
        });
        let completion: Handler<u32> = Handler::with_completion(
            |_: u32, _: ExecutionContext<u32>, done: Completion<u32>| async move {
                done.done()?;
                anyhow::Ok(())
            },
        );

        assert!(!simple.is_completion_style());
        assert!(completion.is_completion_style());
    }

    #[test]
    fn test_trait_object_handler_name() {
        let handler: Handler<u32> = Handler::Simple(Arc::new(Named));
        assert_eq!(handler.name(), "named");

        let debug = format!("{:?}", handler.clone());
        assert!(debug.contains("Simple"));
        assert!(debug.contains("named"));
    }
}
