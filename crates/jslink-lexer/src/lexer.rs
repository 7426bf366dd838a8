//! Core JavaScript lexer: converts program text to a token stream.
//!
//! Features:
//! - ES5 punctuators, keywords, identifiers (including `$` and Unicode letters)
//! - Decimal, fractional, exponent and hex number literals, kept as written
//! - Single- and double-quoted strings with the full escape set
//! - Line and block comments, tracked for automatic semicolon insertion
//! - Regular expression literals and template literals rejected with a
//!   dedicated error instead of being mis-tokenised
//! - Error recovery: collects up to [`MAX_ERRORS`] errors instead of stopping

use jslink_types::{CompileErrors, ErrorCode, JsError, SourceFile, Span, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The JavaScript lexer.
pub struct Lexer<'src> {
    /// The full program text.
    source: &'src str,
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    file_name: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    col: u32,
    /// A line terminator was skipped since the last token.
    saw_newline: bool,
    /// Whether the last token can end an expression; decides between
    /// division and a regular expression literal when `/` is seen.
    prev_ends_expr: bool,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: &source_file.source,
            source_file,
            file_name: &source_file.name,
            pos: 0,
            line: 1,
            col: 1,
            // the start of input counts as a line start
            saw_newline: true,
            prev_ends_expr: false,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire program into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            self.prev_ends_expr = ends_expression(&token.kind);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span(), true));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = JsError::new(self.file_name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = JsError::new(self.file_name, code, message, span, source_line)
            .with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments, noting any line terminator crossed.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                self.saw_newline = true;
                self.advance();
            } else if ch.is_whitespace() || ch == '\u{FEFF}' {
                self.advance();
            } else if ch == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.peek() {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.advance();
                }
            } else if ch == '/' && self.peek_at(1) == Some('*') {
                self.skip_block_comment();
            } else {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_COMMENT,
                        "Unterminated block comment",
                        span,
                    );
                    return;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some(c) if is_line_terminator(c) => self.saw_newline = true,
                Some(_) => {}
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();
        let newline_before = std::mem::take(&mut self.saw_newline);

        if self.errors.total_errors >= MAX_ERRORS {
            return Token::new(TokenKind::Eof, self.current_span(), newline_before);
        }

        let (start_line, start_col) = (self.line, self.col);
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span(), true);
        };

        let kind = match ch {
            '"' | '\'' => self.scan_string(ch, start_line, start_col),
            '0'..='9' => self.scan_number(ch, start_line, start_col),
            '.' if matches!(self.peek(), Some('0'..='9')) => {
                self.scan_number(ch, start_line, start_col)
            }
            c if is_ident_start(c) => self.scan_identifier(c),
            '\\' => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    "Unicode escapes in identifiers are not supported",
                    span,
                );
                return self.rescan(newline_before);
            }
            '`' => {
                self.skip_template(start_line, start_col);
                return self.rescan(newline_before);
            }
            '/' if !self.prev_ends_expr => {
                self.skip_regexp(start_line, start_col);
                return self.rescan(newline_before);
            }
            _ => match self.scan_punctuator(ch) {
                Some(kind) => kind,
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("Unexpected character '{ch}'"),
                        span,
                    );
                    return self.rescan(newline_before);
                }
            },
        };

        Token::new(kind, self.span_from(start_line, start_col), newline_before)
    }

    /// Error recovery: scan the next token, keeping the pending newline flag.
    fn rescan(&mut self, newline_before: bool) -> Token {
        let mut token = self.scan_token();
        token.newline_before |= newline_before;
        token
    }

    fn scan_punctuator(&mut self, ch: char) -> Option<TokenKind> {
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '.' => {
                if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::ShlEq
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat('=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            TokenKind::UShrEq
                        } else {
                            TokenKind::UShr
                        }
                    } else if self.eat('=') {
                        TokenKind::ShrEq
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat('=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AmpAmp
                } else if self.eat('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::PipePipe
                } else if self.eat('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            '*' => self.with_assign(TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_assign(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_assign(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.with_assign(TokenKind::Caret, TokenKind::CaretEq),
            _ => return None,
        };
        Some(kind)
    }

    fn with_assign(&mut self, plain: TokenKind, compound: TokenKind) -> TokenKind {
        if self.eat('=') {
            compound
        } else {
            plain
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);
        while let Some(ch) = self.peek() {
            if is_ident_part(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::from_keyword(&text).unwrap_or(TokenKind::Identifier(text))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, first: char, start_line: u32, start_col: u32) -> TokenKind {
        let start = self.pos - first.len_utf8();

        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            let mut digits = 0;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.advance();
                digits += 1;
            }
            if digits == 0 {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    "Hexadecimal literal has no digits",
                    span,
                );
            }
        } else {
            if first != '.' {
                self.skip_digits();
                if self.peek() == Some('.') {
                    self.advance();
                }
            }
            self.skip_digits();
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_at(1), Some('+' | '-'));
                let digit_at = if signed { 2 } else { 1 };
                if matches!(self.peek_at(digit_at), Some('0'..='9')) {
                    self.advance();
                    if signed {
                        self.advance();
                    }
                    self.skip_digits();
                } else {
                    self.advance();
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(ErrorCode::INVALID_NUMBER, "Exponent has no digits", span);
                }
            }
        }

        if matches!(self.peek(), Some(c) if is_ident_start(c) || c.is_ascii_digit()) {
            while matches!(self.peek(), Some(c) if is_ident_part(c)) {
                self.advance();
            }
            let span = self.span_from(start_line, start_col);
            self.emit_error(
                ErrorCode::INVALID_NUMBER,
                format!(
                    "Identifier starts immediately after number '{}'",
                    &self.source[start..self.pos]
                ),
                span,
            );
        }

        TokenKind::Number(self.source[start..self.pos].to_string())
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after its opening quote.
    fn scan_string(&mut self, quote: char, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(c) if is_line_terminator(c) => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                        "Escape line breaks inside strings as \\n",
                    );
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => self.scan_escape_sequence(&mut buf),
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
        TokenKind::String(buf)
    }

    /// Scan an escape sequence starting at the `\` and append its value.
    fn scan_escape_sequence(&mut self, buf: &mut String) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();

        let Some(ch) = self.advance() else {
            return;
        };
        match ch {
            'n' => buf.push('\n'),
            't' => buf.push('\t'),
            'r' => buf.push('\r'),
            'b' => buf.push('\u{8}'),
            'f' => buf.push('\u{C}'),
            'v' => buf.push('\u{B}'),
            '0' if !matches!(self.peek(), Some('0'..='9')) => buf.push('\0'),
            'x' => match self.scan_hex_digits(2) {
                Some(code) => buf.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                None => self.invalid_escape("\\x", start_line, start_col),
            },
            'u' => self.scan_unicode_escape(buf, start_line, start_col),
            '\r' => {
                self.eat('\n');
            }
            c if is_line_terminator(c) => {}
            c => buf.push(c),
        }
    }

    fn scan_unicode_escape(&mut self, buf: &mut String, start_line: u32, start_col: u32) {
        let code = if self.eat('{') {
            let mut code: u32 = 0;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                self.advance();
                code = code.saturating_mul(16).saturating_add(d);
                digits += 1;
            }
            if digits == 0 || !self.eat('}') {
                self.invalid_escape("\\u{...}", start_line, start_col);
                return;
            }
            code
        } else {
            match self.scan_hex_digits(4) {
                Some(code) => code,
                None => {
                    self.invalid_escape("\\u", start_line, start_col);
                    return;
                }
            }
        };

        if (0xD800..0xDC00).contains(&code)
            && self.peek() == Some('\\')
            && self.peek_at(1) == Some('u')
        {
            let checkpoint = (self.pos, self.line, self.col);
            self.advance();
            self.advance();
            if let Some(low) = self.scan_hex_digits(4).filter(|l| (0xDC00..0xE000).contains(l)) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    buf.push(c);
                    return;
                }
            }
            (self.pos, self.line, self.col) = checkpoint;
        }

        match char::from_u32(code) {
            Some(c) => buf.push(c),
            None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("Escape \\u{{{code:X}}} is not a valid Unicode scalar value"),
                    span,
                );
            }
        }
    }

    /// Consume exactly `count` hex digits, or nothing if fewer are present.
    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for i in 0..count {
            code = code * 16 + self.peek_at(i)?.to_digit(16)?;
        }
        for _ in 0..count {
            self.advance();
        }
        Some(code)
    }

    fn invalid_escape(&mut self, form: &str, start_line: u32, start_col: u32) {
        let span = self.span_from(start_line, start_col);
        self.emit_error(
            ErrorCode::INVALID_ESCAPE,
            format!("Malformed {form} escape sequence"),
            span,
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Rejected literal forms
    // ─────────────────────────────────────────────────────────────

    /// Skip a regular expression literal after its opening `/`.
    fn skip_regexp(&mut self, start_line: u32, start_col: u32) {
        let mut in_class = false;
        loop {
            match self.peek() {
                None => break,
                Some(c) if is_line_terminator(c) => break,
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance();
                    while matches!(self.peek(), Some(c) if is_ident_part(c)) {
                        self.advance();
                    }
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let span = self.span_from(start_line, start_col);
        self.emit_error_with_suggestion(
            ErrorCode::UNSUPPORTED_REGEXP,
            "Regular expression literals are not supported",
            span,
            "Construct the pattern with new RegExp(...)",
        );
    }

    /// Skip a template literal after its opening backtick.
    fn skip_template(&mut self, start_line: u32, start_col: u32) {
        loop {
            match self.advance() {
                None | Some('`') => break,
                Some('\\') => {
                    self.advance();
                }
                Some(c) if is_line_terminator(c) => self.saw_newline = true,
                Some(_) => {}
            }
        }
        let span = self.span_from(start_line, start_col);
        self.emit_error_with_suggestion(
            ErrorCode::UNSUPPORTED_SYNTAX,
            "Template literals are not supported",
            span,
            "Use string concatenation",
        );
    }
}

// ─────────────────────────────────────────────────────────────────────
// Character classes
// ─────────────────────────────────────────────────────────────────────

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_ident_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_ident_part(ch: char) -> bool {
    is_ident_start(ch) || ch.is_alphanumeric() || ch == '\u{200C}' || ch == '\u{200D}'
}

/// Whether a `/` following this token is a division operator.
fn ends_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::This
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Super
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
    )
}
