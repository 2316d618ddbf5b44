//! Observability utilities.
//!
//! The engine logs through `tracing`. Each execution runs inside an
//! `execution` span carrying the pipeline name, execution ID and depth.

mod tracing;

pub use self::tracing::{init_tracing, try_init_tracing, SpanTimer, TracingFormat};
