//! jslink parser: converts a token stream into a JavaScript AST.

mod height;
mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};
