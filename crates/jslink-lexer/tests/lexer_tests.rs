//! Lexer tests: keywords, punctuators, literals, comments, newline
//! tracking, rejected literal forms, error recovery and determinism.

use jslink_lexer::{Lexer, TokenKind, ALL_KEYWORDS};
use jslink_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return the token kinds, excluding the final Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

fn num(raw: &str) -> TokenKind {
    TokenKind::Number(raw.to_string())
}

fn string(value: &str) -> TokenKind {
    TokenKind::String(value.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_keywords_lex_as_keywords() {
    for word in ALL_KEYWORDS {
        let result = kinds(word);
        assert_eq!(result.len(), 1, "keyword {word}");
        assert!(result[0].is_keyword(), "{word} lexed as {:?}", result[0]);
    }
}

#[test]
fn test_identifier_characters() {
    assert_eq!(
        kinds("$ _a $jscomp a1 caf\u{e9} undefined"),
        vec![
            ident("$"),
            ident("_a"),
            ident("$jscomp"),
            ident("a1"),
            ident("caf\u{e9}"),
            ident("undefined"),
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("variable inx format"), vec![ident("variable"), ident("inx"), ident("format")]);
}

// ─────────────────────────────────────────────────────────────────────
// Punctuators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_longest_match_punctuators() {
    assert_eq!(
        kinds(">>>= >>> >>= >> >= > === == = !== != !"),
        vec![
            TokenKind::UShrEq,
            TokenKind::UShr,
            TokenKind::ShrEq,
            TokenKind::Shr,
            TokenKind::GreaterEq,
            TokenKind::Greater,
            TokenKind::EqEqEq,
            TokenKind::EqEq,
            TokenKind::Eq,
            TokenKind::BangEqEq,
            TokenKind::BangEq,
            TokenKind::Bang,
        ]
    );
}

#[test]
fn test_update_and_compound_operators() {
    assert_eq!(
        kinds("a++ + ++b; c-=1"),
        vec![
            ident("a"),
            TokenKind::PlusPlus,
            TokenKind::Plus,
            TokenKind::PlusPlus,
            ident("b"),
            TokenKind::Semicolon,
            ident("c"),
            TokenKind::MinusEq,
            num("1"),
        ]
    );
}

#[test]
fn test_arrow_and_spread_are_tokens() {
    assert_eq!(
        kinds("=> ..."),
        vec![TokenKind::Arrow, TokenKind::DotDotDot]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers_kept_as_written() {
    assert_eq!(
        kinds("0 42 3.14 .5 1. 1e10 2E-3 0x1F 0XaB"),
        vec![
            num("0"),
            num("42"),
            num("3.14"),
            num(".5"),
            num("1."),
            num("1e10"),
            num("2E-3"),
            num("0x1F"),
            num("0XaB"),
        ]
    );
}

#[test]
fn test_member_access_on_number_needs_two_dots() {
    assert_eq!(
        kinds("1..toString"),
        vec![num("1."), TokenKind::Dot, ident("toString")]
    );
}

#[test]
fn test_invalid_numbers() {
    assert_eq!(error_codes("0x"), vec![ErrorCode::INVALID_NUMBER]);
    assert_eq!(error_codes("1e+"), vec![ErrorCode::INVALID_NUMBER]);
    assert_eq!(error_codes("3in x"), vec![ErrorCode::INVALID_NUMBER]);
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_both_quote_styles() {
    assert_eq!(
        kinds(r#""it's" 'say "hi"'"#),
        vec![string("it's"), string("say \"hi\"")]
    );
}

#[test]
fn test_escape_sequences() {
    assert_eq!(
        kinds(r#""\n\t\r\b\f\v\0\\\'\"\x41B\u{43}\q""#),
        vec![string("\n\t\r\u{8}\u{c}\u{b}\0\\'\"ABCq")]
    );
}

#[test]
fn test_line_continuation_in_string() {
    assert_eq!(kinds("'a\\\nb'"), vec![string("ab")]);
}

#[test]
fn test_unterminated_string() {
    assert_eq!(error_codes("'abc"), vec![ErrorCode::UNTERMINATED_STRING]);
    assert_eq!(error_codes("'abc\nd'"), vec![
        ErrorCode::UNTERMINATED_STRING,
        ErrorCode::UNTERMINATED_STRING,
    ]);
}

#[test]
fn test_malformed_escapes() {
    assert_eq!(error_codes(r#""\x4""#), vec![ErrorCode::INVALID_ESCAPE]);
    assert_eq!(error_codes(r#""\u12""#), vec![ErrorCode::INVALID_ESCAPE]);
    assert_eq!(error_codes(r#""\uD800""#), vec![ErrorCode::INVALID_ESCAPE]);
}

// ─────────────────────────────────────────────────────────────────────
// Comments & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block */ b /**/c"),
        vec![ident("a"), ident("b"), ident("c")]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(error_codes("a /* never"), vec![ErrorCode::UNTERMINATED_COMMENT]);
}

#[test]
fn test_newline_before_flags() {
    let sf = SourceFile::new("test.js", "a\nb c // x\nd\r\ne\u{2028}f");
    let tokens = Lexer::new(&sf).lex().tokens;
    let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
    // a, b, c, d, e, f, Eof
    assert_eq!(flags, vec![true, true, false, true, true, true, true]);
}

#[test]
fn test_token_spans() {
    let sf = SourceFile::new("test.js", "var x\n  = 10;");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!((tokens[0].span.start_line, tokens[0].span.start_col), (1, 1));
    assert_eq!((tokens[0].span.end_line, tokens[0].span.end_col), (1, 3));
    assert_eq!((tokens[2].span.start_line, tokens[2].span.start_col), (2, 3));
    assert_eq!((tokens[3].span.start_col, tokens[3].span.end_col), (5, 6));
}

// ─────────────────────────────────────────────────────────────────────
// Division versus regular expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_division_after_operands() {
    assert_eq!(
        kinds("a / 2; (b) / c; x[0] /= 3"),
        vec![
            ident("a"),
            TokenKind::Slash,
            num("2"),
            TokenKind::Semicolon,
            TokenKind::LParen,
            ident("b"),
            TokenKind::RParen,
            TokenKind::Slash,
            ident("c"),
            TokenKind::Semicolon,
            ident("x"),
            TokenKind::LBracket,
            num("0"),
            TokenKind::RBracket,
            TokenKind::SlashEq,
            num("3"),
        ]
    );
}

#[test]
fn test_regexp_literal_rejected() {
    assert_eq!(error_codes("x = /a+[/]b/gi;"), vec![ErrorCode::UNSUPPORTED_REGEXP]);
    assert_eq!(error_codes("return /x/.test(s)"), vec![ErrorCode::UNSUPPORTED_REGEXP]);
}

#[test]
fn test_regexp_skipped_as_a_unit() {
    assert_eq!(
        kinds("x = /a b/g; y"),
        vec![ident("x"), TokenKind::Eq, TokenKind::Semicolon, ident("y")]
    );
}

#[test]
fn test_template_literal_rejected() {
    assert_eq!(error_codes("`a ${b} c`"), vec![ErrorCode::UNSUPPORTED_SYNTAX]);
    assert_eq!(kinds("x = `t`;"), vec![ident("x"), TokenKind::Eq, TokenKind::Semicolon]);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovers() {
    assert_eq!(error_codes("a # b"), vec![ErrorCode::UNEXPECTED_CHARACTER]);
    assert_eq!(kinds("a # b"), vec![ident("a"), ident("b")]);
}

#[test]
fn test_error_cap_stops_lexing() {
    let source = "#".repeat(50);
    let sf = SourceFile::new("test.js", source);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), jslink_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

#[test]
fn test_error_carries_source_line() {
    let sf = SourceFile::new("perm.js", "ok();\nbad @ here;");
    let result = Lexer::new(&sf).lex();
    let err = result.errors.first().expect("one error");
    assert_eq!(err.file, "perm.js");
    assert_eq!(err.source_line, "bad @ here;");
    assert_eq!((err.span.start_line, err.span.start_col), (2, 5));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lexer_determinism_100_iterations() {
    let source = "function f(a, b) {\n  var s = 'x\\u0041' + a / b;\n  return s.length >>> 0;\n}";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(kinds(source), first, "Determinism failure at iteration {i}");
    }
}
