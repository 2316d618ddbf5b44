//! Pipeline configuration.

use crate::errors::ChainflowError;
use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "pipeline".to_string()
}

fn default_emit_events() -> bool {
    true
}

/// Configuration shared by every execution of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name used in tracing spans and lifecycle events.
    #[serde(default = "default_name")]
    pub name: String,

    /// Deepest allowed nesting level; `None` means unbounded.
    ///
    /// Root executions are at depth 0. A spawn that would create an execution
    /// deeper than this yields a failed nested result instead of running.
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Whether lifecycle events are sent to the pipeline's event sink.
    #[serde(default = "default_emit_events")]
    pub emit_events: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_depth: None,
            emit_events: default_emit_events(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Enables or disables lifecycle events.
    #[must_use]
    pub fn with_emit_events(mut self, emit_events: bool) -> Self {
        self.emit_events = emit_events;
        self
    }

    /// Parses a configuration from JSON, filling in defaults.
    pub fn from_json(json: &str) -> Result<Self, ChainflowError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for invalid values.
    pub fn validate(&self) -> Result<(), ChainflowError> {
        if self.name.trim().is_empty() {
            return Err(ChainflowError::Config(
                "pipeline name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if an execution at `depth` may run.
    #[must_use]
    pub fn allows_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.name, "pipeline");
        assert_eq!(config.max_depth, None);
        assert!(config.emit_events);
        assert!(config.allows_depth(u32::MAX));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PipelineConfig::from_json(r#"{"name": "import", "max_depth": 2}"#).unwrap();
        assert_eq!(config.name, "import");
        assert_eq!(config.max_depth, Some(2));
        assert!(config.emit_events);
        assert!(config.allows_depth(2));
        assert!(!config.allows_depth(3));
    }

    #[test]
    fn test_from_json_rejects_empty_name() {
        let err = PipelineConfig::from_json(r#"{"name": "  "}"#).unwrap_err();
        assert!(matches!(err, ChainflowError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = PipelineConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ChainflowError::Serialization(_)));
    }

    #[test]
    fn test_builder_setters() {
        let config = PipelineConfig::new("scan").with_max_depth(0).with_emit_events(false);
        assert!(config.allows_depth(0));
        assert!(!config.allows_depth(1));
        assert!(!config.emit_events);
    }
}
