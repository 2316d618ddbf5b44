//! Execution results and error aggregation.

use crate::errors::{ChainflowError, HandlerError, ProtocolViolation};
use serde::Serialize;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// An error reported by a handler in some execution of the pipeline.
///
/// `input_path_trace` starts with the input of the handler that failed and
/// ends with the input of the top-level execution. Each element in between is
/// the input of an execution that spawned the next-inner one.
#[derive(Debug, Clone)]
pub struct PipelineError<T> {
    /// Display message of the cause.
    pub message: String,
    /// Inputs from the failing handler out to the top-level execution.
    pub input_path_trace: Vec<T>,
    /// The original failure.
    pub cause: Arc<HandlerError>,
}

impl<T> PipelineError<T> {
    /// Creates an error for a handler that failed on `input`.
    pub fn new(input: T, cause: impl Into<HandlerError>) -> Self {
        let cause = cause.into();
        Self {
            message: cause.to_string(),
            input_path_trace: vec![input],
            cause: Arc::new(cause),
        }
    }

    /// Returns the input of the handler that failed.
    #[must_use]
    pub fn failing_input(&self) -> Option<&T> {
        self.input_path_trace.first()
    }

    /// Returns the input of the top-level execution.
    #[must_use]
    pub fn root_input(&self) -> Option<&T> {
        self.input_path_trace.last()
    }

    /// Returns the original failure.
    #[must_use]
    pub fn cause(&self) -> &HandlerError {
        &self.cause
    }

    /// Returns the cause as `E`, if it is one.
    #[must_use]
    pub fn downcast_cause<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.cause.downcast_ref::<E>()
    }

    /// Returns the protocol violation behind this error, if any.
    ///
    /// Covers both violations the engine detected and violations a handler
    /// propagated with `?`.
    #[must_use]
    pub fn protocol_violation(&self) -> Option<ProtocolViolation> {
        self.downcast_cause::<ProtocolViolation>().copied().or_else(|| {
            self.downcast_cause::<ChainflowError>()
                .and_then(ChainflowError::protocol_violation)
        })
    }

    /// Records the input of an enclosing execution.
    pub(crate) fn push_ancestor(&mut self, input: T) {
        self.input_path_trace.push(input);
    }
}

impl<T: Serialize> PipelineError<T> {
    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "input_path_trace": serde_json::to_value(&self.input_path_trace)
                .unwrap_or(serde_json::Value::Null),
            "cause": format!("{:#}", self.cause),
        })
    }
}

impl<T> Display for PipelineError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<T: Debug> std::error::Error for PipelineError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&**self.cause)
    }
}

/// The aggregated outcome of an execution and all of its descendants.
#[derive(Debug, Clone)]
pub struct PipelineResult<T, R = ()> {
    /// True iff no handler in this execution or any descendant failed.
    pub ok: bool,
    /// Values passed to completion signals, local first, then nested.
    pub data: Vec<R>,
    /// Every error from this execution and its descendants.
    pub errors: Vec<PipelineError<T>>,
}

impl<T, R> PipelineResult<T, R> {
    /// Creates a successful result.
    #[must_use]
    pub fn success(data: Vec<R>) -> Self {
        Self {
            ok: true,
            data,
            errors: Vec::new(),
        }
    }

    /// Creates a failed result with a single error.
    #[must_use]
    pub fn failure(error: PipelineError<T>) -> Self {
        Self {
            ok: false,
            data: Vec::new(),
            errors: vec![error],
        }
    }

    /// Returns true if the execution succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns the message of every error.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Converts into a `Result`, keeping data on success and errors on failure.
    pub fn into_result(self) -> Result<Vec<R>, Vec<PipelineError<T>>> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self.errors)
        }
    }
}

impl<T: Clone, R> PipelineResult<T, R> {
    /// Combines an execution's own outcome with its nested results.
    ///
    /// Errors from nested results get `input` appended to their trace.
    pub(crate) fn aggregate(
        input: &T,
        local: Result<Option<R>, PipelineError<T>>,
        nested: Vec<Self>,
    ) -> Self {
        let mut result = match local {
            Ok(value) => Self::success(value.into_iter().collect()),
            Err(error) => Self::failure(error),
        };

        for child in nested {
            result.ok &= child.ok;
            result.data.extend(child.data);
            result.errors.extend(child.errors.into_iter().map(|mut error| {
                error.push_ancestor(input.clone());
                error
            }));
        }

        result
    }
}

impl<T: Serialize, R: Serialize> PipelineResult<T, R> {
    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ok": self.ok,
            "data": serde_json::to_value(&self.data).unwrap_or(serde_json::Value::Null),
            "errors": self.errors.iter().map(PipelineError::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Splits results into successes and failures.
pub fn partition_results<T, R>(
    results: impl IntoIterator<Item = PipelineResult<T, R>>,
) -> (Vec<PipelineResult<T, R>>, Vec<PipelineResult<T, R>>) {
    results.into_iter().partition(PipelineResult::is_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn error(input: u32, message: &'static str) -> PipelineError<u32> {
        PipelineError::new(input, anyhow::anyhow!(message))
    }

    #[test]
    fn test_new_error_has_single_trace_entry() {
        let err = error(7, "boom");
        assert_eq!(err.message, "boom");
        assert_eq!(err.input_path_trace, vec![7]);
        assert_eq!(err.failing_input(), Some(&7));
        assert_eq!(err.root_input(), Some(&7));
    }

    #[test]
    fn test_aggregate_appends_ancestor_input() {
        let nested = vec![
            PipelineResult::<u32, u32>::success(vec![1]),
            PipelineResult::failure(error(0, "leaf")),
        ];

        let result = PipelineResult::aggregate(&5, Ok(Some(9)), nested);

        assert!(!result.ok);
        assert_eq!(result.data, vec![9, 1]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].input_path_trace, vec![0, 5]);
    }

    #[test]
    fn test_aggregate_keeps_local_error_first() {
        let nested = vec![PipelineResult::<u32, ()>::failure(error(1, "nested"))];
        let result = PipelineResult::aggregate(&3, Err(error(3, "local")), nested);

        assert_eq!(result.messages(), vec!["local", "nested"]);
        assert_eq!(result.errors[0].input_path_trace, vec![3]);
        assert_eq!(result.errors[1].input_path_trace, vec![1, 3]);
    }

    #[test]
    fn test_aggregate_success() {
        let result = PipelineResult::<u32, u32>::aggregate(&1, Ok(None), vec![]);
        assert!(result.ok);
        assert!(result.data.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_protocol_violation_lookup() {
        let direct = PipelineError::new(1_u32, ProtocolViolation::DoubleForward);
        assert_eq!(direct.protocol_violation(), Some(ProtocolViolation::DoubleForward));

        let wrapped = PipelineError::new(1_u32, ChainflowError::from(ProtocolViolation::DoubleComplete));
        assert_eq!(wrapped.protocol_violation(), Some(ProtocolViolation::DoubleComplete));

        assert_eq!(error(1, "plain").protocol_violation(), None);
    }

    #[test]
    fn test_error_source_is_cause() {
        use std::error::Error;

        let err = PipelineError::new(1_u32, ProtocolViolation::DoubleComplete);
        let source = err.source().map(ToString::to_string);
        assert_eq!(source, Some("complete() called twice".to_string()));
    }

    #[test]
    fn test_into_result() {
        let ok = PipelineResult::<u32, u32>::success(vec![4]);
        assert_eq!(ok.into_result().unwrap(), vec![4]);

        let failed = PipelineResult::<u32, u32>::failure(error(2, "x"));
        assert_eq!(failed.into_result().unwrap_err().len(), 1);
    }

    #[test]
    fn test_partition_results() {
        let results = vec![
            PipelineResult::<u32, ()>::success(vec![]),
            PipelineResult::failure(error(1, "a")),
            PipelineResult::success(vec![]),
        ];

        let (succeeded, failed) = partition_results(results);
        assert_eq!(succeeded.len(), 2);
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn test_to_json() {
        let mut err = error(0, "leaf");
        err.push_ancestor(2);
        let result = PipelineResult::<u32, u32> {
            ok: false,
            data: vec![],
            errors: vec![err],
        };

        let json = result.to_json();
        assert_eq!(json["ok"], serde_json::json!(false));
        assert_eq!(json["errors"][0]["input_path_trace"], serde_json::json!([0, 2]));
        assert_eq!(json["errors"][0]["message"], serde_json::json!("leaf"));
    }
}
