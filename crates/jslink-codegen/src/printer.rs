//! Output buffer and program entry point.

use jslink_types::ast::{Expr, Program};
use jslink_types::StatementRanges;

use crate::expr::{emit_expr, Prec};
use crate::stmt::emit_stmt;

/// Whitespace policy for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStyle {
    Compact,
    Pretty,
}

/// A printed program and the spans of its top-level statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedJs {
    pub js: String,
    pub statement_ranges: StatementRanges,
}

/// Print a whole program.
pub fn print_program(program: &Program, style: PrintStyle) -> PrintedJs {
    let mut p = Printer::new(style);
    let mut starts = Vec::with_capacity(program.body.len());
    let mut ends = Vec::with_capacity(program.body.len());

    for stmt in &program.body {
        p.begin_line();
        starts.push(p.len());
        emit_stmt(stmt, &mut p);
        ends.push(p.len());
        p.end_line();
    }

    let statement_ranges = match StatementRanges::new(starts, ends) {
        Ok(ranges) => ranges,
        Err(err) => {
            // Every statement prints at least one character, in order.
            debug_assert!(false, "printer produced invalid ranges: {err}");
            StatementRanges::empty()
        }
    };
    PrintedJs {
        js: p.finish(),
        statement_ranges,
    }
}

/// Print a single expression, as it would appear in operand position.
pub fn print_expr(expr: &Expr, style: PrintStyle) -> String {
    let mut p = Printer::new(style);
    emit_expr(expr, Prec::Sequence, &mut p);
    p.finish()
}

// ══════════════════════════════════════════════════════════════════════════════
// Printer
// ══════════════════════════════════════════════════════════════════════════════

/// Append-only text buffer that knows where whitespace is required.
pub struct Printer {
    out: String,
    style: PrintStyle,
    indent: usize,
}

impl Printer {
    pub fn new(style: PrintStyle) -> Self {
        Self {
            out: String::new(),
            style,
            indent: 0,
        }
    }

    pub fn style(&self) -> PrintStyle {
        self.style
    }

    pub fn is_pretty(&self) -> bool {
        self.style == PrintStyle::Pretty
    }

    /// Byte length of the output so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> String {
        self.out
    }

    // ── Tokens ────────────────────────────────────────────────────────────────

    /// Write an identifier, keyword or literal, separating it from a
    /// preceding word character.
    pub fn word(&mut self, text: &str) {
        let starts_word = text.chars().next().is_some_and(is_word_char);
        if starts_word && self.out.chars().next_back().is_some_and(is_word_char) {
            self.out.push(' ');
        }
        self.out.push_str(text);
    }

    /// Write an operator or punctuator, separating `+ +` and `- -` so they
    /// do not fuse into `++` / `--`.
    pub fn punct(&mut self, text: &str) {
        if let (Some(last), Some(first)) = (self.out.chars().next_back(), text.chars().next()) {
            let fuses = (last == '+' || last == '-') && last == first;
            // `<!--` opens an HTML-style comment in script text
            let html_comment = first == '-' && self.out.ends_with("<!");
            if fuses || html_comment {
                self.out.push(' ');
            }
        }
        self.out.push_str(text);
    }

    /// Write a word-like operator (`typeof`, `in`, `instanceof`) or a
    /// symbolic one, picking the right separation rule.
    pub fn operator(&mut self, text: &str) {
        if text.chars().next().is_some_and(is_word_char) {
            self.word(text);
        } else {
            self.punct(text);
        }
    }

    /// A space that is only written in pretty output.
    pub fn space(&mut self) {
        if self.is_pretty() {
            self.out.push(' ');
        }
    }

    /// A binary operator, padded with spaces in pretty output.
    pub fn binary_operator(&mut self, text: &str) {
        self.space();
        self.operator(text);
        self.space();
    }

    /// `,` followed by a space in pretty output.
    pub fn comma(&mut self) {
        self.out.push(',');
        self.space();
    }

    // ── Lines ─────────────────────────────────────────────────────────────────

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Start a statement line: indentation in pretty output.
    pub fn begin_line(&mut self) {
        if self.is_pretty() {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
        }
    }

    /// Finish a statement line: a newline in pretty output.
    pub fn end_line(&mut self) {
        if self.is_pretty() {
            self.out.push('\n');
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphanumeric() || ch == '\\'
}
