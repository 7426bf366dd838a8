//! Token types for the JavaScript lexer.
//!
//! Defines [`TokenKind`] covering every ES5 lexeme plus the few newer ones
//! the parser must recognise in order to reject them, and [`Token`], which
//! pairs a kind with a source [`Span`].

use jslink_types::Span;
use std::fmt;

/// Reserved words the lexer turns into keyword tokens.
///
/// Contextual words (`get`, `set`, `of`, `static`, `async`, `yield`) are
/// ordinary identifiers.
pub const ALL_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    /// Drives automatic semicolon insertion and the restricted productions.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            span,
            newline_before,
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals & names ─────────────────────────────────────

    Identifier(String),
    /// Numeric literal exactly as written: `42`, `0x1F`, `.5e3`
    Number(String),
    /// String literal with escapes resolved.
    String(String),

    // ── Keywords ─────────────────────────────────────────────

    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,

    // ── Punctuation ──────────────────────────────────────────

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    DotDotDot,
    Semicolon,
    Comma,
    Question,
    Colon,
    /// `=>`, lexed only so arrow functions can be rejected with a clear error.
    Arrow,

    // ── Operators ────────────────────────────────────────────

    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    BangEq,
    EqEqEq,
    BangEqEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Shl,
    Shr,
    UShr,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,
    AmpAmp,
    PipePipe,

    // ── Assignment ───────────────────────────────────────────

    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    ShlEq,
    ShrEq,
    UShrEq,
    AmpEq,
    PipeEq,
    CaretEq,

    Eof,
}

impl TokenKind {
    /// Keyword token for `text`, if it is a reserved word.
    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "break" => Self::Break,
            "case" => Self::Case,
            "catch" => Self::Catch,
            "class" => Self::Class,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "debugger" => Self::Debugger,
            "default" => Self::Default,
            "delete" => Self::Delete,
            "do" => Self::Do,
            "else" => Self::Else,
            "enum" => Self::Enum,
            "export" => Self::Export,
            "extends" => Self::Extends,
            "false" => Self::False,
            "finally" => Self::Finally,
            "for" => Self::For,
            "function" => Self::Function,
            "if" => Self::If,
            "import" => Self::Import,
            "in" => Self::In,
            "instanceof" => Self::Instanceof,
            "let" => Self::Let,
            "new" => Self::New,
            "null" => Self::Null,
            "return" => Self::Return,
            "super" => Self::Super,
            "switch" => Self::Switch,
            "this" => Self::This,
            "throw" => Self::Throw,
            "true" => Self::True,
            "try" => Self::Try,
            "typeof" => Self::Typeof,
            "var" => Self::Var,
            "void" => Self::Void,
            "while" => Self::While,
            "with" => Self::With,
            _ => return None,
        };
        Some(kind)
    }

    /// The reserved word this token was lexed from, if any.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Self::Break => "break",
            Self::Case => "case",
            Self::Catch => "catch",
            Self::Class => "class",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Debugger => "debugger",
            Self::Default => "default",
            Self::Delete => "delete",
            Self::Do => "do",
            Self::Else => "else",
            Self::Enum => "enum",
            Self::Export => "export",
            Self::Extends => "extends",
            Self::False => "false",
            Self::Finally => "finally",
            Self::For => "for",
            Self::Function => "function",
            Self::If => "if",
            Self::Import => "import",
            Self::In => "in",
            Self::Instanceof => "instanceof",
            Self::Let => "let",
            Self::New => "new",
            Self::Null => "null",
            Self::Return => "return",
            Self::Super => "super",
            Self::Switch => "switch",
            Self::This => "this",
            Self::Throw => "throw",
            Self::True => "true",
            Self::Try => "try",
            Self::Typeof => "typeof",
            Self::Var => "var",
            Self::Void => "void",
            Self::While => "while",
            Self::With => "with",
            _ => return None,
        };
        Some(text)
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    fn punctuator_text(&self) -> Option<&'static str> {
        let text = match self {
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Dot => ".",
            Self::DotDotDot => "...",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Question => "?",
            Self::Colon => ":",
            Self::Arrow => "=>",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::EqEqEq => "===",
            Self::BangEqEq => "!==",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Bang => "!",
            Self::Tilde => "~",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::Eq => "=",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            Self::PercentEq => "%=",
            Self::ShlEq => "<<=",
            Self::ShrEq => ">>=",
            Self::UShrEq => ">>>=",
            Self::AmpEq => "&=",
            Self::PipeEq => "|=",
            Self::CaretEq => "^=",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Number(raw) => write!(f, "{raw}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Eof => write!(f, "end of input"),
            other => {
                let text = other
                    .keyword_text()
                    .or_else(|| other.punctuator_text())
                    .unwrap_or("?");
                write!(f, "{text}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_round_trips() {
        for word in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(word).expect("listed keyword");
            assert_eq!(kind.keyword_text(), Some(*word));
            assert_eq!(kind.to_string(), *word);
        }
    }

    #[test]
    fn contextual_words_are_not_keywords() {
        for word in ["get", "set", "of", "static", "yield", "undefined", "arguments"] {
            assert_eq!(TokenKind::from_keyword(word), None);
        }
    }

    #[test]
    fn display_punctuators_and_literals() {
        assert_eq!(TokenKind::UShrEq.to_string(), ">>>=");
        assert_eq!(TokenKind::Identifier("foo".into()).to_string(), "foo");
        assert_eq!(TokenKind::String("a\"b".into()).to_string(), "\"a\\\"b\"");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
