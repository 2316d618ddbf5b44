//! Execution context and invocation bookkeeping.
//!
//! This module provides:
//! - [`ExecutionContext`], the capability object each handler receives
//! - [`Completion`], the one-shot signal given to completion-style handlers
//! - [`ExecutionInfo`], the identity of one execution in the nesting tree

mod completion;
mod execution;
mod identity;
mod state;

pub use completion::Completion;
pub use execution::ExecutionContext;
pub use identity::ExecutionInfo;

pub(crate) use execution::ExecutionScope;
pub(crate) use state::{Invocation, InvocationState, Notifier};
