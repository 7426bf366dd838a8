use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors stored before the front end stops collecting.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Malformed input (E100–E199).
    Syntax,
    /// Valid JavaScript the pipeline does not accept (E200–E299).
    Unsupported,
}

/// Numeric error code (E100–E299).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNTERMINATED_COMMENT: Self = Self(102);
    pub const INVALID_ESCAPE: Self = Self(103);
    pub const INVALID_NUMBER: Self = Self(104);
    pub const UNEXPECTED_CHARACTER: Self = Self(105);
    pub const MISSING_SEMICOLON: Self = Self(106);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(107);
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(108);

    // ── Unsupported syntax (E200–E299) ──
    pub const UNSUPPORTED_REGEXP: Self = Self(200);
    pub const UNSUPPORTED_SYNTAX: Self = Self(201);
    pub const UNSUPPORTED_WITH: Self = Self(202);
    pub const UNSUPPORTED_ACCESSOR: Self = Self(203);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Unsupported,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A structured front-end error with its location in the program text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsError {
    /// Name of the program text (permutation or fragment name).
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, verbatim.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl JsError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for JsError {}

/// Errors and warnings collected while lexing and parsing one program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<JsError>,
    pub warnings: Vec<JsError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Record an error; only the first [`MAX_ERRORS`] are stored.
    pub fn push_error(&mut self, error: JsError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: JsError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Append everything from `other`, respecting the storage cap.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }

    /// The first stored error, if any.
    pub fn first(&self) -> Option<&JsError> {
        self.errors.first()
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) if self.total_errors > 1 => {
                write!(f, "{first} (and {} more)", self.total_errors - 1)
            }
            Some(first) => write!(f, "{first}"),
            None => write!(f, "no errors"),
        }
    }
}
