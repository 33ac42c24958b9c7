use jsonschema::Draft;

use crate::error::{EngineError, Result};

/// How much work evaluation does when detailed output is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Stop collecting errors after the first violation.
    FastValidation,
    /// Collect every violation in evaluator order.
    #[default]
    Exhaustive,
}

impl Mode {
    /// Map the C ABI mode value (`0` fast, `1` exhaustive).
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::FastValidation),
            1 => Some(Self::Exhaustive),
            _ => None,
        }
    }
}

/// Limits applied when loading schema files from a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of schemas loaded from a directory.
    pub max_schemas_from_directory: usize,
    /// Maximum bytes allowed per schema file loaded from a directory.
    pub max_schema_file_size: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_schemas_from_directory: 256,
            max_schema_file_size: 256 * 1024,
        }
    }
}

/// Controls compilation and evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Detailed-output behavior baked into compiled schemas.
    pub mode: Mode,
    /// Metaschema URI used when a schema carries no `$schema` keyword.
    pub default_dialect: Option<String>,
    /// Upper bound for schema, instance and resolved document text.
    pub max_document_bytes: usize,
    /// Limits for [`crate::SchemaStore::load_directory`].
    pub store_limits: StoreLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            default_dialect: None,
            max_document_bytes: 8 * 1024 * 1024,
            store_limits: StoreLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default_dialect(mut self, dialect: Option<impl Into<String>>) -> Self {
        self.default_dialect = dialect.map(Into::into);
        self
    }

    /// Reject `text` when it exceeds `max_document_bytes`.
    pub fn check_size(&self, text: &str) -> Result<()> {
        if text.len() > self.max_document_bytes {
            tracing::warn!(
                size = text.len(),
                limit = self.max_document_bytes,
                "rejecting oversized document"
            );
            return Err(EngineError::DocumentTooLarge {
                size: text.len(),
                limit: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

/// Resolve a metaschema URI to the draft it identifies.
pub fn draft_for_dialect(uri: &str) -> Result<Draft> {
    let trimmed = uri.trim_end_matches('#');
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    match without_scheme {
        "json-schema.org/draft-04/schema" => Ok(Draft::Draft4),
        "json-schema.org/draft-06/schema" => Ok(Draft::Draft6),
        "json-schema.org/draft-07/schema" => Ok(Draft::Draft7),
        "json-schema.org/draft/2019-09/schema" => Ok(Draft::Draft201909),
        "json-schema.org/draft/2020-12/schema" => Ok(Draft::Draft202012),
        _ => Err(EngineError::UnknownDialect(uri.to_string())),
    }
}
