//! Shared types for the jslink pipeline.
//!
//! This crate defines the JavaScript AST, source spans, structured front-end
//! errors and the [`StatementRanges`] algebra used by every later stage.

mod error;
mod span;
pub mod ast;
pub mod statement_ranges;
pub mod visit;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, JsError, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};
pub use statement_ranges::{RangeError, StatementRanges, StatementRangesBuilder};

/// Result type used by the front-end stages.
pub type Result<T> = std::result::Result<T, JsError>;
