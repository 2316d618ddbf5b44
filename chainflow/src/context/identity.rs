//! Execution identity for tracking nested executions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one execution and its place in the nesting tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    /// The unique ID of this execution.
    pub execution_id: Uuid,

    /// The ID of the execution that spawned this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,

    /// Nesting depth; root executions are at depth 0.
    pub depth: u32,
}

impl ExecutionInfo {
    /// Creates the identity of a root execution.
    #[must_use]
    pub fn root() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            parent_id: None,
            depth: 0,
        }
    }

    /// Creates the identity of an execution spawned by this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            parent_id: Some(self.execution_id),
            depth: self.depth + 1,
        }
    }

    /// Returns true for root executions.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_identity() {
        let info = ExecutionInfo::root();
        assert!(info.is_root());
        assert_eq!(info.depth, 0);
    }

    #[test]
    fn test_child_identity() {
        let root = ExecutionInfo::root();
        let child = root.child();
        let grandchild = child.child();

        assert_eq!(child.parent_id, Some(root.execution_id));
        assert_eq!(grandchild.parent_id, Some(child.execution_id));
        assert_eq!(grandchild.depth, 2);
        assert_ne!(child.execution_id, root.execution_id);
    }

    #[test]
    fn test_root_serialization_omits_parent() {
        let json = serde_json::to_value(ExecutionInfo::root()).unwrap();
        assert!(json.get("parent_id").is_none());
        assert_eq!(json["depth"], 0);
    }
}
