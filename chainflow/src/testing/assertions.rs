//! Test assertions for pipeline results.

use crate::pipeline::PipelineResult;
use std::fmt::Debug;

/// Asserts that the result indicates success.
pub fn assert_succeeded<T, R>(result: &PipelineResult<T, R>) {
    assert!(
        result.ok,
        "Expected success, got errors: {:?}",
        result.messages()
    );
}

/// Asserts that the result indicates failure.
pub fn assert_failed<T, R>(result: &PipelineResult<T, R>) {
    assert!(!result.ok, "Expected failure, got success");
}

/// Asserts that the result carries exactly `expected` errors.
pub fn assert_error_count<T, R>(result: &PipelineResult<T, R>, expected: usize) {
    assert_eq!(
        result.errors.len(),
        expected,
        "Expected {} errors, got {}: {:?}",
        expected,
        result.errors.len(),
        result.messages()
    );
}

/// Asserts the error messages, in order.
pub fn assert_error_messages<T, R>(result: &PipelineResult<T, R>, expected: &[&str]) {
    assert_eq!(result.messages(), expected, "Unexpected error messages");
}

/// Asserts that every error trace starts with `failing` and ends with `root`.
pub fn assert_trace_bounds<T, R>(result: &PipelineResult<T, R>, failing: &T, root: &T)
where
    T: PartialEq + Debug,
{
    for error in &result.errors {
        assert_eq!(
            error.failing_input(),
            Some(failing),
            "Unexpected failing input in trace {:?}",
            error.input_path_trace
        );
        assert_eq!(
            error.root_input(),
            Some(root),
            "Unexpected root input in trace {:?}",
            error.input_path_trace
        );
    }
}
