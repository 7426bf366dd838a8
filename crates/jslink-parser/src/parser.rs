//! Core parser infrastructure: token cursor, error reporting, helpers.

use jslink_lexer::token::{Token, TokenKind};
use jslink_types::ast::{Expr, Ident, Program};
use jslink_types::{CompileErrors, ErrorCode, JsError, SourceFile, Span, MAX_ERRORS};

use crate::height::{link_height, MAX_CHAIN_HEIGHT};

/// Deepest statement/expression nesting accepted before parsing gives up.
pub(crate) const MAX_NESTING: u32 = 128;

/// The JavaScript parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and recovers at statement boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    file_name: String,
    errors: CompileErrors,
    /// Current statement + expression nesting depth.
    depth: u32,
    /// Set while parsing a `for (...;` head, where `in` ends the expression.
    pub(crate) no_in: bool,
}

/// Result of parsing.
pub struct ParseResult {
    /// The parsed program. May be partial when `errors` is non-empty.
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            file_name: source_file.name.clone(),
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
            no_in: false,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 0,
                start_col: 0,
                end_line: 0,
                end_col: 0,
            },
            newline_before: true,
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Index of the current token, for [`Parser::synchronize`].
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// A line terminator separates the current token from the previous one.
    pub(crate) fn newline_before(&self) -> bool {
        self.peek().newline_before
    }

    // ── Semicolons ────────────────────────────────────────────────────────────

    /// Consume a statement-terminating `;`, inserting one where the grammar
    /// allows: before `}`, at end of input, or after a line break.
    pub(crate) fn consume_semicolon(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
            || self.newline_before()
        {
            return Some(());
        }
        self.error_at_current(
            ErrorCode::MISSING_SEMICOLON,
            format!("expected ';', got '{}'", self.peek_kind()),
        );
        None
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect a binding or reference identifier. Reserved words are refused.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            TokenKind::LBracket | TokenKind::LBrace => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "destructuring patterns are not supported",
                );
                None
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{other}'"),
                );
                None
            }
        }
    }

    /// Expect a property name after `.`; reserved words are allowed here.
    pub(crate) fn expect_property_name(&mut self) -> Option<String> {
        let kind = self.peek_kind().clone();
        match kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Some(name)
            }
            ref k if k.is_keyword() => {
                let name = k.to_string();
                self.advance();
                Some(name)
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected property name, got '{other}'"),
                );
                None
            }
        }
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Enter one nesting level. Returns `None` (after reporting) when the
    /// limit is exceeded; callers must pair a successful `enter` with `leave`.
    pub(crate) fn enter(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum nesting depth is {MAX_NESTING}"),
            );
            return None;
        }
        self.depth += 1;
        Some(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Check a freshly built chain link whose chained operand was `spine`
    /// tall. Returns the link's height, or `None` (after reporting) when the
    /// chain has grown past [`MAX_CHAIN_HEIGHT`].
    pub(crate) fn chain_link(&mut self, link: &Expr, spine: u32) -> Option<u32> {
        let height = link_height(link, spine);
        if height > MAX_CHAIN_HEIGHT {
            let span = self.previous_span();
            self.error_at(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("expression is nested more than {MAX_CHAIN_HEIGHT} levels deep"),
                span,
            );
            return None;
        }
        Some(height)
    }

    /// Run `f` with `no_in` set to `value`, restoring the previous setting.
    pub(crate) fn with_no_in<T>(&mut self, value: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_in, value);
        let result = f(self);
        self.no_in = saved;
        result
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = JsError::new(&self.file_name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a likely statement boundary.
    /// Used after an error in a statement that began at token index `from`;
    /// at least one token is consumed since `from` before stopping.
    pub(crate) fn synchronize(&mut self, from: usize) {
        while !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            if self.pos > from {
                if self.check(&TokenKind::RBrace) {
                    return;
                }
                if self.newline_before() && starts_statement(self.peek_kind()) {
                    return;
                }
            }
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}

fn starts_statement(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::If
            | TokenKind::For
            | TokenKind::While
            | TokenKind::Do
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Throw
            | TokenKind::Try
            | TokenKind::Switch
            | TokenKind::Identifier(_)
    )
}
