//! Pipeline building and execution.
//!
//! This module provides:
//! - The [`Pipeline`] type and its fluent [`PipelineBuilder`]
//! - Pipeline configuration
//! - The execution engine that runs a handler chain and joins nested work
//! - Aggregated results with input path traces

mod builder;
mod config;
mod engine;
mod execution;
mod nested;
mod result;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use engine::Pipeline;
pub use nested::NestedExecution;
pub use result::{partition_results, PipelineError, PipelineResult};
