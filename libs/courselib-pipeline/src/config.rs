//! Pipeline settings, passed explicitly at process start.

use serde::{Deserialize, Serialize};

use crate::translator::VALIDATION_PROBLEM_TYPE;

/// Deployment mode. Development is the diagnostic mode: faults are shown
/// with full detail instead of the opaque production message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_diagnostic(self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Problem `type` URI reported for semantic validation failures.
    pub validation_problem_type: String,
    /// Answer 406 when the client accepts none of the output formats.
    pub return_http_not_acceptable: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            validation_problem_type: VALIDATION_PROBLEM_TYPE.to_owned(),
            return_http_not_acceptable: true,
        }
    }
}
