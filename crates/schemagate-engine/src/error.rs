/// Errors raised while parsing, compiling, resolving or evaluating schemas.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Schema or instance text is not valid JSON.
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A document exceeded the configured size limit.
    #[error("document too large ({size} bytes, limit {limit})")]
    DocumentTooLarge { size: usize, limit: usize },

    /// The requested default dialect is not a known metaschema URI.
    #[error("unknown default dialect: {0}")]
    UnknownDialect(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// Neither the store nor the host resolver could supply a document.
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// A schema could not be loaded into the store.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The validation outcome could not be encoded or decoded.
    #[error("failed to encode validation outcome: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
