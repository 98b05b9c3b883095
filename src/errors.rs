//! Global error handling.
//!
//! Each sub-crate of the project defines its own type error.
//! Their types can be unified, for example in a main function,
//! when winding results at the top-level.
//!
//! ```rust,no_run
//! use heapflow::prelude::*;
//!
//! fn main() -> HfResult<()> { // can return a HfError
//!    let _program = load_program("program.json")?; // can return an IrError
//!    Ok(())
//! }
//! ```

use hf_analysis::errors::AnalysisError;
use hf_ir::errors::IrError;
use std::io;
use thiserror::Error;

/// An alias for result that can be a [`HfError`].
pub type HfResult<T> = Result<T, HfError>;

/// The main error type for error winding at the top-level.
/// It mainly consists of transparent wrapper over error types that
/// are defined in dependencies.
#[derive(Debug, Error)]
pub enum HfError {
    /// Custom error for reporting bad command line arguments usage.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// Error that can be returned from [I/O operations](std::io).
    #[error(transparent)]
    IO(#[from] io::Error),

    /// Error that can be returned from regex compilation.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Error that can be returned from [`hf_analysis`] functions.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Error that can be returned from [`hf_ir`] functions.
    #[error(transparent)]
    Ir(#[from] IrError),
}
