//! Optimizer error types.

use jslink_types::CompileErrors;
use thiserror::Error;

/// Errors that abort an optimization pass.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The program text could not be lexed or parsed. Every stored error
    /// carries its file, line and column.
    #[error("cannot optimize {file}: {errors}")]
    Syntax { file: String, errors: CompileErrors },

    /// An output mode name outside `compact`, `pretty` and `detailed`.
    #[error("unknown output mode `{0}`; expected one of compact, pretty, detailed")]
    UnknownOutputMode(String),
}

/// Optimizer result type alias.
pub type OptimizeResult<T> = Result<T, OptimizeError>;
