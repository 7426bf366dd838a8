//! Parser tests: statements, expressions and precedence, automatic
//! semicolon insertion, rejected syntax, error recovery and determinism.

use jslink_lexer::Lexer;
use jslink_parser::{ParseResult, Parser};
use jslink_types::ast::*;
use jslink_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.js", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors: {}", lex.errors);
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program.expect("no program returned")
}

fn first_code(source: &str) -> ErrorCode {
    parse(source).errors.first().expect("expected an error").code
}

/// The expression of a single expression statement.
fn expr(source: &str) -> Expr {
    let program = parse_ok(source);
    assert_eq!(program.body.len(), 1);
    match program.body.into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Expr(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn ident_name(expr: &Expr) -> &str {
    match &expr.kind {
        ExprKind::Ident(ident) => &ident.name,
        other => panic!("expected identifier, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_function_declaration() {
    let program = parse_ok("function add(a, b) { return a + b; }");
    let func = program.body[0].as_function_decl().expect("function");
    assert_eq!(func.name.as_ref().map(|n| n.name.as_str()), Some("add"));
    let params: Vec<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["a", "b"]);
    assert!(matches!(func.body[0].kind, StmtKind::Return(Some(_))));
}

#[test]
fn test_var_let_const_declarations() {
    let program = parse_ok("var a = 1, b; let c = 2; const d = 3;");
    let kinds: Vec<VarKind> = program
        .body
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Var(decl) => decl.kind,
            other => panic!("expected declaration, got {other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec![VarKind::Var, VarKind::Let, VarKind::Const]);
    match &program.body[0].kind {
        StmtKind::Var(decl) => {
            assert_eq!(decl.declarators.len(), 2);
            assert!(decl.declarators[1].init.is_none());
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_control_flow_statements() {
    let program = parse_ok(
        "if (a) b(); else { c(); }
         for (var i = 0; i < n; i++) {}
         for (k in obj) continue;
         for (var k2 in obj) break;
         for (;;) break;
         while (x) x--;
         do y++; while (y < 3)
         switch (v) { case 1: one(); break; default: other(); }
         try { t(); } catch (e) { h(e); } finally { f(); }
         outer: for (;;) { break outer; }
         throw new Error('x');
         debugger;
         ;",
    );
    let kinds: Vec<&str> = program
        .body
        .iter()
        .map(|s| match &s.kind {
            StmtKind::If { .. } => "if",
            StmtKind::For { .. } => "for",
            StmtKind::ForIn { .. } => "for-in",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Try { .. } => "try",
            StmtKind::Labeled { .. } => "label",
            StmtKind::Throw(_) => "throw",
            StmtKind::Debugger => "debugger",
            StmtKind::Empty => "empty",
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "if", "for", "for-in", "for-in", "for", "while", "do", "switch", "try", "label",
            "throw", "debugger", "empty"
        ]
    );
}

#[test]
fn test_switch_cases() {
    let program = parse_ok("switch (x) { case 1: case 2: a(); break; default: b(); }");
    match &program.body[0].kind {
        StmtKind::Switch { cases, .. } => {
            assert_eq!(cases.len(), 3);
            assert!(cases[0].body.is_empty());
            assert_eq!(cases[1].body.len(), 2);
            assert!(cases[2].test.is_none());
        }
        other => panic!("expected switch, got {other:?}"),
    }
}

#[test]
fn test_for_in_with_in_operator_in_init_parens() {
    let program = parse_ok("for (var x = ('a' in o); x; ) {}");
    assert!(matches!(program.body[0].kind, StmtKind::For { .. }));
}

#[test]
fn test_directive_prologue() {
    let program = parse_ok("'use strict'; var a;");
    assert_eq!(program.body[0].as_directive(), Some("use strict"));
    assert_eq!(program.body[1].as_directive(), None);
}

// ─────────────────────────────────────────────────────────────────────
// Automatic semicolon insertion
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_asi_at_newline_brace_and_eof() {
    let program = parse_ok("a = 1\nb = 2\nfunction f() { return c }\nd()");
    assert_eq!(program.body.len(), 4);
}

#[test]
fn test_return_newline_ends_statement() {
    let program = parse_ok("function f() { return\n42; }");
    let func = program.body[0].as_function_decl().expect("function");
    assert!(matches!(func.body[0].kind, StmtKind::Return(None)));
    assert_eq!(func.body.len(), 2);
}

#[test]
fn test_postfix_operator_after_newline_is_prefix() {
    let program = parse_ok("a\n++b");
    assert_eq!(program.body.len(), 2);
    match &program.body[1].kind {
        StmtKind::Expr(Expr {
            kind: ExprKind::Update { prefix, .. },
            ..
        }) => assert!(*prefix),
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn test_missing_semicolon_on_same_line() {
    assert_eq!(first_code("a = 1 b = 2"), ErrorCode::MISSING_SEMICOLON);
}

// ─────────────────────────────────────────────────────────────────────
// Expressions & precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiplication_binds_tighter() {
    match expr("a + b * c").kind {
        ExprKind::Binary { op, left, right } => {
            assert_eq!(op, BinaryOp::Add);
            assert_eq!(ident_name(&left), "a");
            assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_binary_left_associative() {
    match expr("a - b - c").kind {
        ExprKind::Binary { left, right, .. } => {
            assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
            assert_eq!(ident_name(&right), "c");
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_assignment_right_associative() {
    match expr("a = b += c").kind {
        ExprKind::Assign { op, value, .. } => {
            assert_eq!(op, AssignOp::Assign);
            assert!(matches!(value.kind, ExprKind::Assign { op: AssignOp::Add, .. }));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_conditional_and_logical() {
    match expr("a || b ? c : d && e").kind {
        ExprKind::Conditional {
            test, alternate, ..
        } => {
            assert!(matches!(test.kind, ExprKind::Binary { op: BinaryOp::Or, .. }));
            assert!(matches!(alternate.kind, ExprKind::Binary { op: BinaryOp::And, .. }));
        }
        other => panic!("expected conditional, got {other:?}"),
    }
}

#[test]
fn test_parentheses_only_group() {
    match expr("(a + b) * c").kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::Mul);
            assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_new_with_member_and_call() {
    // (new a.b(c)).d(e)
    match expr("new a.b(c).d(e)").kind {
        ExprKind::Call { callee, args } => {
            assert_eq!(args.len(), 1);
            match callee.kind {
                ExprKind::Member { object, property } => {
                    assert_eq!(property, "d");
                    assert!(matches!(object.kind, ExprKind::New { .. }));
                }
                other => panic!("expected member, got {other:?}"),
            }
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_new_without_arguments() {
    match expr("new Foo").kind {
        ExprKind::New { args, .. } => assert!(args.is_empty()),
        other => panic!("expected new, got {other:?}"),
    }
}

#[test]
fn test_keyword_property_names() {
    match expr("a.default.in").kind {
        ExprKind::Member { property, .. } => assert_eq!(property, "in"),
        other => panic!("expected member, got {other:?}"),
    }
}

#[test]
fn test_object_and_array_literals() {
    match expr("x = {a: 1, 'b': [1, , 2], 3: function () {}, if: null,}").kind {
        ExprKind::Assign { value, .. } => match value.kind {
            ExprKind::Object(props) => {
                assert_eq!(props.len(), 4);
                assert_eq!(props[0].key, PropKey::Ident("a".into()));
                assert_eq!(props[1].key, PropKey::String("b".into()));
                assert_eq!(props[2].key, PropKey::Number("3".into()));
                assert_eq!(props[3].key, PropKey::Ident("if".into()));
                match &props[1].value.kind {
                    ExprKind::Array(elements) => {
                        assert_eq!(elements.len(), 3);
                        assert!(elements[1].is_none());
                    }
                    other => panic!("expected array, got {other:?}"),
                }
            }
            other => panic!("expected object, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_sequence_and_unary() {
    match expr("a, !b, typeof c, void 0, delete d.e").kind {
        ExprKind::Sequence(exprs) => assert_eq!(exprs.len(), 5),
        other => panic!("expected sequence, got {other:?}"),
    }
}

#[test]
fn test_function_expression_name_optional() {
    match expr("x = function () { return 1; }").kind {
        ExprKind::Assign { value, .. } => match value.kind {
            ExprKind::Function(func) => assert!(func.name.is_none()),
            other => panic!("expected function, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Rejected syntax
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_with_rejected() {
    assert_eq!(first_code("with (o) { a(); }"), ErrorCode::UNSUPPORTED_WITH);
}

#[test]
fn test_accessor_rejected() {
    assert_eq!(first_code("x = { get a() { return 1; } };"), ErrorCode::UNSUPPORTED_ACCESSOR);
    assert_eq!(first_code("x = { set a(v) {} };"), ErrorCode::UNSUPPORTED_ACCESSOR);
}

#[test]
fn test_get_and_set_as_plain_keys() {
    parse_ok("x = { get: 1, set: 2 }; y = x.get + x.set;");
}

#[test]
fn test_modern_syntax_rejected() {
    for source in [
        "class A {}",
        "var f = (a) => a;",
        "for (var x of xs) {}",
        "f(...args);",
        "var o = { a };",
        "var o = { m() {} };",
        "var o = { [k]: 1 };",
        "function f(a = 1) {}",
        "var [a, b] = c;",
    ] {
        assert_eq!(first_code(source), ErrorCode::UNSUPPORTED_SYNTAX, "{source}");
    }
}

#[test]
fn test_invalid_assignment_targets() {
    assert_eq!(first_code("1 = a;"), ErrorCode::INVALID_ASSIGNMENT_TARGET);
    assert_eq!(first_code("f() = a;"), ErrorCode::INVALID_ASSIGNMENT_TARGET);
    assert_eq!(first_code("(a + b)++;"), ErrorCode::INVALID_ASSIGNMENT_TARGET);
}

#[test]
fn test_nesting_limit() {
    let source = format!("x = {}1{};", "(".repeat(300), ")".repeat(300));
    assert_eq!(first_code(&source), ErrorCode::NESTING_LIMIT_EXCEEDED);
}

#[test]
fn test_long_operator_chain_is_rejected() {
    let source = format!("x = {};", vec!["a"; 10_000].join(" + "));
    assert_eq!(first_code(&source), ErrorCode::NESTING_LIMIT_EXCEEDED);
}

#[test]
fn test_long_call_and_member_chains_are_rejected() {
    let calls = format!("f{};", "()".repeat(10_000));
    assert_eq!(first_code(&calls), ErrorCode::NESTING_LIMIT_EXCEEDED);
    let members = format!("a{};", ".b".repeat(10_000));
    assert_eq!(first_code(&members), ErrorCode::NESTING_LIMIT_EXCEEDED);
    let indexes = format!("new a{}();", "[0]".repeat(10_000));
    assert_eq!(first_code(&indexes), ErrorCode::NESTING_LIMIT_EXCEEDED);
}

#[test]
fn test_chain_within_limit_parses() {
    let source = format!("x = {};", vec!["a"; 900].join(" * "));
    let program = parse_ok(&source);
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_recovers_after_long_chain() {
    let source = format!("x = {};\nvar after = 1;", vec!["a"; 5_000].join(" - "));
    let result = parse(&source);
    assert_eq!(result.errors.total_errors, 1);
    let program = result.program.expect("partial program");
    assert!(program
        .body
        .iter()
        .any(|s| matches!(&s.kind, StmtKind::Var(_))));
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovers_after_bad_statement() {
    let result = parse("var = 1;\nfunction ok() {}\nvar b = ;\nok();");
    assert_eq!(result.errors.total_errors, 2);
    let program = result.program.expect("partial program");
    assert!(program
        .body
        .iter()
        .any(|s| s.as_function_decl().is_some()));
}

#[test]
fn test_error_inside_block_keeps_block() {
    let result = parse("function f() { var = 1; }\nvar after = 2;");
    assert_eq!(result.errors.total_errors, 1);
    let program = result.program.expect("partial program");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_statement_spans() {
    let program = parse_ok("var a = 1;\n\nfunction f() {\n}\n");
    let span = program.body[1].span;
    assert_eq!((span.start_line, span.start_col), (3, 1));
    assert_eq!((span.end_line, span.end_col), (4, 1));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_determinism_100_iterations() {
    let source = "function f(a) { var o = {k: a}; for (var p in o) { if (o[p]) return p; } }\nf(1);";
    let first = parse_ok(source);
    for i in 0..100 {
        assert_eq!(parse_ok(source), first, "Determinism failure at iteration {i}");
    }
}
