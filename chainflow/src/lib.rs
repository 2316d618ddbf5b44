//! # Chainflow
//!
//! An asynchronous handler-chain execution engine.
//!
//! A [`Pipeline`](pipeline::Pipeline) is an ordered list of handlers run over a
//! single input value. Each handler can:
//!
//! - **Forward** a (possibly transformed) value to the next handler
//! - **Complete** the chain explicitly, optionally producing a result value
//! - **Spawn** nested executions of the same pipeline over new input
//!
//! Nested executions run concurrently and are always joined before the
//! enclosing execution reports its [`PipelineResult`](pipeline::PipelineResult).
//! Failures never escape `execute`; they are collected as
//! [`PipelineError`](pipeline::PipelineError)s whose input path trace records
//! which branch of the workflow failed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainflow::prelude::*;
//!
//! let pipeline = Pipeline::<u32>::builder("resolve")
//!     .simple(|value: u32, ctx: ExecutionContext<u32>| async move {
//!         ctx.forward(value + 1)?;
//!         anyhow::Ok(())
//!     })
//!     .simple(|value: u32, ctx: ExecutionContext<u32>| async move {
//!         if value > 1 {
//!             ctx.spawn(value - 1);
//!         }
//!         anyhow::Ok(())
//!     })
//!     .build()?;
//!
//! let result = pipeline.execute(3).await;
//! assert!(result.ok);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cleanup;
pub mod context;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod observability;
pub mod pipeline;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cleanup::CleanupRegistry;
    pub use crate::context::{Completion, ExecutionContext, ExecutionInfo};
    pub use crate::errors::{ChainflowError, HandlerError, ProtocolViolation};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::handlers::{CompletionHandler, Handler, Payload, SimpleHandler};
    pub use crate::pipeline::{
        partition_results, NestedExecution, Pipeline, PipelineBuilder, PipelineConfig,
        PipelineError, PipelineResult,
    };
}
