//! Server-level error types.

use thiserror::Error;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::Url;

#[derive(Debug, Error)]
pub enum StackyError {
    #[error("document not open: {0}")]
    UnknownDocument(Url),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid arguments for {command}: {reason}")]
    InvalidArguments { command: String, reason: String },

    #[error("no Stacky interpreter configured (use --engine or STACKY_ENGINE)")]
    EngineUnavailable,

    #[error("{program} did not finish within {limit_ms} ms")]
    Timeout { program: String, limit_ms: u128 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StackyError>;

impl From<StackyError> for jsonrpc::Error {
    fn from(error: StackyError) -> Self {
        let mut rpc_error = match &error {
            StackyError::UnknownCommand(_) => jsonrpc::Error::method_not_found(),
            StackyError::UnknownDocument(_) | StackyError::InvalidArguments { .. } => {
                jsonrpc::Error::invalid_params(error.to_string())
            }
            StackyError::EngineUnavailable
            | StackyError::Timeout { .. }
            | StackyError::Io(_) => jsonrpc::Error::internal_error(),
        };
        rpc_error.message = error.to_string().into();
        rpc_error
    }
}
