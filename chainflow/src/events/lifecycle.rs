//! Execution lifecycle event payloads.

use crate::context::ExecutionInfo;
use crate::utils::iso_timestamp;
use serde_json::json;
use uuid::Uuid;

/// An event in the life of one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// The execution began running its handler chain.
    Started {
        /// Identity of the execution.
        info: ExecutionInfo,
        /// The pipeline name.
        pipeline: String,
    },
    /// A handler spawned a nested execution.
    Spawned {
        /// Identity of the spawning execution.
        parent: ExecutionInfo,
        /// ID of the new child execution.
        child_id: Uuid,
    },
    /// A spawn was refused by the depth limit.
    SpawnRejected {
        /// Identity of the spawning execution.
        parent: ExecutionInfo,
        /// The configured limit.
        max_depth: u32,
    },
    /// The execution and all of its descendants succeeded.
    Completed {
        /// Identity of the execution.
        info: ExecutionInfo,
        /// Wall time including nested joins.
        duration_ms: f64,
        /// Number of result values collected.
        data_count: usize,
    },
    /// The execution or one of its descendants failed.
    Failed {
        /// Identity of the execution.
        info: ExecutionInfo,
        /// Wall time including nested joins.
        duration_ms: f64,
        /// Messages of every aggregated error.
        errors: Vec<String>,
    },
}

impl ExecutionEvent {
    /// Returns the event type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "execution.started",
            Self::Spawned { .. } => "execution.spawned",
            Self::SpawnRejected { .. } => "execution.spawn_rejected",
            Self::Completed { .. } => "execution.completed",
            Self::Failed { .. } => "execution.failed",
        }
    }

    /// Builds the JSON payload sent to event sinks.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        let mut payload = match self {
            Self::Started { info, pipeline } => json!({
                "execution_id": info.execution_id.to_string(),
                "parent_id": info.parent_id.map(|id| id.to_string()),
                "depth": info.depth,
                "pipeline": pipeline,
            }),
            Self::Spawned { parent, child_id } => json!({
                "execution_id": parent.execution_id.to_string(),
                "child_execution_id": child_id.to_string(),
                "child_depth": parent.depth + 1,
            }),
            Self::SpawnRejected { parent, max_depth } => json!({
                "execution_id": parent.execution_id.to_string(),
                "max_depth": max_depth,
            }),
            Self::Completed { info, duration_ms, data_count } => json!({
                "execution_id": info.execution_id.to_string(),
                "depth": info.depth,
                "duration_ms": duration_ms,
                "data_count": data_count,
            }),
            Self::Failed { info, duration_ms, errors } => json!({
                "execution_id": info.execution_id.to_string(),
                "depth": info.depth,
                "duration_ms": duration_ms,
                "error_count": errors.len(),
                "errors": errors,
            }),
        };

        if let Some(map) = payload.as_object_mut() {
            map.insert("timestamp".to_string(), json!(iso_timestamp()));
        }
        payload
    }
}
