use std::fmt;
use std::io;

use schemagate_engine::EngineError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
/// Schema failed to compile or the instance did not validate.
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn engine_error(context: &str, err: EngineError) -> CliError {
    let code = match err {
        EngineError::InvalidJson(_)
        | EngineError::DocumentTooLarge { .. }
        | EngineError::CompileFailed(_)
        | EngineError::Unresolved(_) => DATA_INVALID,
        EngineError::UnknownDialect(_) => USAGE,
        EngineError::LoadFailed(_) => FAILURE,
        EngineError::Serialize(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
