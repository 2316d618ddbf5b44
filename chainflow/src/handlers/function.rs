//! Closure-backed handlers.

use super::{CompletionHandler, Payload, SimpleHandler};
use crate::context::{Completion, ExecutionContext};
use crate::errors::HandlerError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;

/// A simple handler backed by an async closure.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function-based handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("func", &std::any::type_name::<F>())
            .finish()
    }
}

#[async_trait]
impl<T, R, X, F, Fut> SimpleHandler<T, R, X> for FnHandler<F>
where
    T: Payload,
    R: Payload,
    X: Payload,
    F: Fn(T, ExecutionContext<T, R, X>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    fn name(&self) -> &str {
        std::any::type_name::<F>()
    }

    async fn handle(&self, input: T, ctx: ExecutionContext<T, R, X>) -> Result<(), HandlerError> {
        (self.func)(input, ctx).await
    }
}

/// A completion-style handler backed by an async closure.
pub struct FnCompletionHandler<F> {
    func: F,
}

impl<F> FnCompletionHandler<F> {
    /// Creates a new function-based completion handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnCompletionHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCompletionHandler")
            .field("func", &std::any::type_name::<F>())
            .finish()
    }
}

#[async_trait]
impl<T, R, X, F, Fut> CompletionHandler<T, R, X> for FnCompletionHandler<F>
where
    T: Payload,
    R: Payload,
    X: Payload,
    F: Fn(T, ExecutionContext<T, R, X>, Completion<T, R>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    fn name(&self) -> &str {
        std::any::type_name::<F>()
    }

    async fn handle(
        &self,
        input: T,
        ctx: ExecutionContext<T, R, X>,
        completion: Completion<T, R>,
    ) -> Result<(), HandlerError> {
        (self.func)(input, ctx, completion).await
    }
}
