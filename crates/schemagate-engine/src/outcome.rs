use serde::Serialize;

use crate::error::{EngineError, Result};

/// A single violation reported by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Human-readable description of the violation.
    pub message: String,
    /// JSON pointer into the instance; empty for the root.
    pub instance_location: String,
    /// Path the evaluator took to the failing keyword, `$ref` hops included.
    pub evaluate_path: String,
}

/// Result of one detailed validation.
///
/// Encodes as `{"valid":true}` or
/// `{"valid":false,"errors":[{"message":..,"instance_location":..,"evaluate_path":..}]}`.
/// Entries keep the order the evaluator reported them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ErrorEntry>,
}

impl Outcome {
    /// Build an outcome from collected errors; no errors means valid.
    pub fn from_errors(errors: Vec<ErrorEntry>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Encode as a single JSON document.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| EngineError::Serialize(err.to_string()))
    }
}
