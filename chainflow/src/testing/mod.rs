//! Testing utilities for chainflow pipelines.
//!
//! This module provides:
//! - Assertions over [`PipelineResult`](crate::pipeline::PipelineResult)s
//! - Mock handlers that record or fail

mod assertions;
mod mocks;

pub use assertions::{
    assert_error_count, assert_error_messages, assert_failed, assert_succeeded,
    assert_trace_bounds,
};
pub use mocks::{FailingHandler, RecordingHandler};
