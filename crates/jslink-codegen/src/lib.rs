//! jslink code generator: prints a JavaScript AST back to program text.
//!
//! # Output styles
//!
//! - [`PrintStyle::Compact`] drops all optional whitespace. A space is only
//!   written where two tokens would otherwise fuse (`var a`, `a+ +b`).
//! - [`PrintStyle::Pretty`] writes one statement per line with two-space
//!   indentation and spaces around operators.
//!
//! Parentheses are derived from operator precedence rather than copied from
//! the input, so any well-formed AST prints to text that parses back to the
//! same tree.
//!
//! # Statement ranges
//!
//! [`print_program`] records the byte span of every top-level statement in
//! the output as a [`jslink_types::StatementRanges`]. In pretty output the
//! newline after a statement lies between ranges, never inside one.

pub mod expr;
pub mod parens;
pub mod printer;
pub mod stmt;

pub use printer::{print_expr, print_program, PrintStyle, PrintedJs, Printer};
