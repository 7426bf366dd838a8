//! Code generator tests: compact and pretty output, parenthesisation,
//! statement ranges, reparse stability and determinism.

use jslink_codegen::{print_expr, print_program, PrintStyle, PrintedJs};
use jslink_lexer::Lexer;
use jslink_parser::Parser;
use jslink_types::ast::*;
use jslink_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse_ok(source: &str) -> Program {
    let sf = SourceFile::new("test.js", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors: {}", lex.errors);
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(
        !result.errors.has_errors(),
        "parse errors in {source:?}: {}",
        result.errors
    );
    result.program.expect("no program returned")
}

fn print(source: &str, style: PrintStyle) -> PrintedJs {
    print_program(&parse_ok(source), style)
}

fn compact(source: &str) -> String {
    print(source, PrintStyle::Compact).js
}

fn pretty(source: &str) -> String {
    print(source, PrintStyle::Pretty).js
}

const SAMPLE: &str = r#"
"use strict";
var counter = 0, names = ["a", , "b"];
function Widget(label, size) {
  this.label = label;
  this.size = size || 10;
}
Widget.prototype.render = function (target) {
  for (var i = 0; i < this.size; i++) {
    if (i % 2) continue; else target.push(i);
  }
  for (var key in this) if (this.hasOwnProperty(key)) counter += 1;
  return typeof target === "object" ? target.length : -1;
};
outer: while (counter < 100) {
  switch (counter % 3) {
    case 0: counter++; break;
    case 1: counter += 2; continue outer;
    default: break outer;
  }
}
try { new Widget("x").render([]); } catch (e) { throw e; } finally { counter = 0; }
do counter--; while (counter > 0);
(function () { var hidden = { "a-b": 1, 2: 3, default: 4 }; })();
"#;

// ─────────────────────────────────────────────────────────────────────
// Compact output
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_compact_declarations() {
    assert_eq!(compact("var a = 1, b;"), "var a=1,b;");
    assert_eq!(
        compact("function add(a, b) { return a + b; }"),
        "function add(a,b){return a+b;}"
    );
}

#[test]
fn test_compact_control_flow() {
    assert_eq!(compact("if (a) b(); else c();"), "if(a)b();else c();");
    assert_eq!(compact("do x(); while (y);"), "do x();while(y);");
    assert_eq!(
        compact("outer: for (;;) { break outer; }"),
        "outer:for(;;){break outer;}"
    );
    assert_eq!(compact("for (var k in o) {}"), "for(var k in o){}");
    assert_eq!(
        compact("try { a(); } catch (e) { b(); } finally { c(); }"),
        "try{a();}catch(e){b();}finally{c();}"
    );
    assert_eq!(
        compact("switch (x) { case 1: a(); break; default: b(); }"),
        "switch(x){case 1:a();break;default:b();}"
    );
}

#[test]
fn test_compact_keeps_required_spaces() {
    assert_eq!(compact("a + +b;"), "a+ +b;");
    assert_eq!(compact("a - -b;"), "a- -b;");
    assert_eq!(compact("-(-a);"), "- -a;");
    assert_eq!(
        compact("typeof a === \"undefined\";"),
        "typeof a===\"undefined\";"
    );
    assert_eq!(compact("throw new Error(m);"), "throw new Error(m);");
}

// ─────────────────────────────────────────────────────────────────────
// Parentheses
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_precedence_parens() {
    assert_eq!(compact("(a + b) * c;"), "(a+b)*c;");
    assert_eq!(compact("a - (b - c);"), "a-(b-c);");
    assert_eq!(compact("a - b - c;"), "a-b-c;");
    assert_eq!(compact("a = b = c;"), "a=b=c;");
    assert_eq!(compact("!(a && b);"), "!(a&&b);");
    assert_eq!(compact("f((a, b));"), "f((a,b));");
}

#[test]
fn test_conditional_parens() {
    assert_eq!(compact("a = b ? c : d;"), "a=b?c:d;");
    assert_eq!(compact("a ? b : c ? d : e;"), "a?b:c?d:e;");
    assert_eq!(compact("(a ? b : c) ? d : e;"), "(a?b:c)?d:e;");
    assert_eq!(compact("(a, b) ? c : d;"), "(a,b)?c:d;");
}

#[test]
fn test_statement_start_parens() {
    assert_eq!(compact("(function(){})();"), "(function(){}());");
    assert_eq!(compact("({a: 1});"), "({a:1});");
}

#[test]
fn test_new_and_member_parens() {
    assert_eq!(compact("new Foo;"), "new Foo();");
    assert_eq!(compact("new (f().g)();"), "new(f().g)();");
    assert_eq!(compact("(1).toString();"), "(1).toString();");
    assert_eq!(compact("a.b.c(1, 2)[d];"), "a.b.c(1,2)[d];");
}

#[test]
fn test_for_init_in_is_parenthesised() {
    assert_eq!(
        compact("for (var i = (a in b); i; ) {}"),
        "for(var i=(a in b);i;){}"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(compact("x = \"it's\";"), "x=\"it's\";");
    assert_eq!(compact("x = '</script>';"), "x=\"<\\/script>\";");
    assert_eq!(
        compact("x = {\"a-b\": 1, 2: 3, default: 4};"),
        "x={\"a-b\":1,2:3,default:4};"
    );
    assert_eq!(compact("x = [1, , ];"), "x=[1,,];");
    assert_eq!(compact("x = 0x1F + 1.5e3;"), "x=0x1F+1.5e3;");
}

#[test]
fn test_print_expr() {
    let program = parse_ok("a * (b + c);");
    let StmtKind::Expr(expr) = &program.body[0].kind else {
        panic!("expected expression statement");
    };
    assert_eq!(print_expr(expr, PrintStyle::Compact), "a*(b+c)");
    assert_eq!(print_expr(expr, PrintStyle::Pretty), "a * (b + c)");
}

// ─────────────────────────────────────────────────────────────────────
// Pretty output
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_pretty_function() {
    assert_eq!(
        pretty("function add(a, b) { return a + b; }"),
        "function add(a, b) {\n  return a + b;\n}\n"
    );
}

#[test]
fn test_pretty_nested_blocks() {
    assert_eq!(
        pretty("if (a) { while (b) { c(); } } else d();"),
        "if (a) {\n  while (b) {\n    c();\n  }\n} else d();\n"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Statement ranges
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_compact_statement_ranges() {
    let printed = print("var a = 1; function f() {}", PrintStyle::Compact);
    assert_eq!(printed.js, "var a=1;function f(){}");
    assert_eq!(printed.statement_ranges.starts(), &[0, 8]);
    assert_eq!(printed.statement_ranges.ends(), &[8, 22]);
}

#[test]
fn test_pretty_ranges_exclude_newlines() {
    let printed = print("var a = 1; function f() {}", PrintStyle::Pretty);
    assert_eq!(printed.js, "var a = 1;\nfunction f() {}\n");
    assert_eq!(printed.statement_ranges.starts(), &[0, 11]);
    assert_eq!(printed.statement_ranges.ends(), &[10, 26]);
}

#[test]
fn test_ranges_cover_each_statement_text() {
    let printed = print(SAMPLE, PrintStyle::Compact);
    let program = parse_ok(SAMPLE);
    assert_eq!(printed.statement_ranges.num_statements(), program.body.len());
    for (start, end) in printed.statement_ranges.iter() {
        let text = &printed.js[start..end];
        // every top-level statement reparses on its own
        let reparsed = parse_ok(text);
        assert_eq!(reparsed.body.len(), 1, "statement text {text:?}");
    }
}

#[test]
fn test_empty_program() {
    let printed = print("", PrintStyle::Compact);
    assert_eq!(printed.js, "");
    assert!(printed.statement_ranges.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Reparse stability
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_compact_output_is_stable_under_reparse() {
    let once = compact(SAMPLE);
    let twice = compact(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_pretty_output_is_stable_under_reparse() {
    let once = pretty(SAMPLE);
    let twice = pretty(&once);
    assert_eq!(once, twice);
    // and agrees with the compact rendering of the same tree
    assert_eq!(compact(&once), compact(SAMPLE));
}

#[test]
fn test_dangling_else_survives_reparse() {
    let source = "if (a) { if (b) f(); } else g();";
    let once = compact(source);
    assert_eq!(once, "if(a){if(b)f();}else g();");
    assert_eq!(compact(&once), once);
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_codegen_determinism_100_iterations() {
    let program = parse_ok(SAMPLE);
    let reference = print_program(&program, PrintStyle::Pretty);
    for _ in 0..100 {
        assert_eq!(print_program(&program, PrintStyle::Pretty), reference);
    }
}
