//! Subscriber setup and timing helpers.

use crate::errors::ChainflowError;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Installs a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns [`ChainflowError::Config`] if the filter is invalid or a global
/// subscriber is already installed.
pub fn try_init_tracing(format: TracingFormat) -> Result<(), ChainflowError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER),
    }
    .map_err(|e| ChainflowError::Config(format!("invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match format {
        TracingFormat::Pretty => builder.try_init(),
        TracingFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| ChainflowError::Config(format!("tracing already initialized: {e}")))
}

/// Installs a global subscriber, ignoring an already installed one.
pub fn init_tracing(format: TracingFormat) {
    if let Err(e) = try_init_tracing(format) {
        tracing::debug!(error = %e, "Tracing subscriber not installed");
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        crate::utils::duration_ms(self.start.elapsed())
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span, logs its duration and returns it.
    pub fn finish(self) -> f64 {
        let elapsed = self.elapsed_ms();
        tracing::debug!(span_name = %self.name, duration_ms = elapsed, "Span finished");
        elapsed
    }
}
