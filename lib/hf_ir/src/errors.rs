//! Program representation errors definitions.

use std::io;
use thiserror::Error;

/// An alias for result that can be a [`IrError`].
pub type IrResult<T> = Result<T, IrError>;

/// The program representation error type.
#[derive(Debug, Error)]
pub enum IrError {
    /// Error that can be returned when reading a program description.
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// Error that can be returned when decoding a JSON program description.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Custom internal error type.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid type descriptor: {0}")]
    InvalidType(String),

    #[error("invalid method subsignature: {0}")]
    InvalidSubsignature(String),

    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("class {0} is defined twice")]
    DuplicateClass(String),

    #[error("field {0} is declared twice")]
    DuplicateField(String),

    #[error("method {0} is declared twice")]
    DuplicateMethod(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("variable not found: {0}")]
    VariableNotFound(String),

    #[error("variable {var} does not belong to method {method}")]
    ForeignVariable { var: String, method: String },

    #[error("method {method} expects {expected} parameters, {found} given")]
    ParameterCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("abstract method {0} cannot have a body")]
    AbstractBody(String),

    #[error("malformed statement in {method}: {reason}")]
    MalformedStatement { method: String, reason: String },

    #[error("the program has no entry method")]
    NoEntryMethod,
}
