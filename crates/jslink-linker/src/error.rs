//! Linker error types.

use std::path::PathBuf;

use jslink_compiler::OptimizeError;
use thiserror::Error;

/// Errors that abort a link pass.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A directory or file could not be created, written or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staging target that is not a relative path below the output root.
    #[error("invalid staging target `{target}`")]
    InvalidTarget { target: String },

    /// A buffer that was not opened in the current staging session.
    #[error("buffer for `{path}` was not opened in this staging session")]
    UnknownBuffer { path: String },

    /// A buffer committed a second time.
    #[error("buffer for `{path}` was already committed")]
    AlreadyCommitted { path: String },

    /// No compilation result has this strong name.
    #[error("no compilation result with strong name {0}")]
    UnknownStrongName(String),

    /// Program text routed through the optimizer was rejected.
    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    /// Link options could not be read.
    #[error("invalid link options: {0}")]
    Options(#[from] serde_json::Error),

    /// A linker reported a failure of its own.
    #[error("linker `{linker}` failed: {message}")]
    Linker { linker: String, message: String },
}

impl LinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Linker result type alias.
pub type LinkResult<T> = Result<T, LinkError>;
