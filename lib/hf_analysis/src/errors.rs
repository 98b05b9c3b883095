//! Analysis errors definition.

use hf_ir::errors::IrError;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("program error: {0}")]
    Ir(#[from] IrError),

    #[error("the program has no entry method")]
    NoEntryMethod,

    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// No non-abstract method matches the subsignature along the superclass
    /// chain of the receiver type.
    #[error("cannot dispatch {subsignature} on {receiver} at {call_site}")]
    UnresolvedDispatch {
        call_site: String,
        receiver: String,
        subsignature: String,
    },

    #[error("unrecognized call kind '{kind}' at {call_site}")]
    UnrecognizedCallKind { call_site: String, kind: String },

    #[error("invalid context sensitivity: {0}")]
    InvalidContextSensitivity(String),
}
