//! End-to-end pipeline tests: JS text → optimized JS text for every output
//! mode, plus error scenarios.

use jslink_compiler::{optimize_javascript, parse_program, OptimizeError, OutputMode};
use jslink_types::ErrorCode;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

const ENTRY: &str = "gwtOnLoad";

const MODULE: &str = r#"
function gwtOnLoad() { helper("x"); helper("x"); }
function helper(message) { log(message); }
function unused() {}
"#;

fn optimize(source: &str, mode: OutputMode) -> String {
    match optimize_javascript("perm0.js", source, ENTRY, mode) {
        Ok(out) => out.js,
        Err(err) => panic!("optimization failed: {err}"),
    }
}

fn syntax_error(source: &str) -> ErrorCode {
    match optimize_javascript("perm0.js", source, ENTRY, OutputMode::Compact) {
        Err(OptimizeError::Syntax { errors, .. }) => errors.first().expect("an error").code,
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Output modes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_compact_mode() {
    let out = optimize_javascript("perm0.js", MODULE, ENTRY, OutputMode::Compact).unwrap();
    assert_eq!(
        out.js,
        "function gwtOnLoad(){var b=\"x\";a(b);a(b);}function a(a){log(a);}"
    );
    assert_eq!(out.stats.functions_removed, 1);
    assert_eq!(out.stats.strings_interned, 1);
    assert_eq!(out.stats.symbols_renamed, 3);
}

#[test]
fn test_pretty_mode_keeps_names() {
    let out = optimize_javascript("perm0.js", MODULE, ENTRY, OutputMode::Pretty).unwrap();
    assert_eq!(
        out.js,
        "function gwtOnLoad() {\n  helper(\"x\");\n  helper(\"x\");\n}\n\
         function helper(message) {\n  log(message);\n}\n"
    );
    assert_eq!(out.stats.strings_interned, 0);
    assert_eq!(out.stats.symbols_renamed, 0);
}

#[test]
fn test_detailed_mode_uses_traceable_names() {
    assert_eq!(
        optimize(MODULE, OutputMode::Detailed),
        "function gwtOnLoad() {\n  var $intern_0_1 = \"x\";\n  helper_0($intern_0_1);\n  \
         helper_0($intern_0_1);\n}\nfunction helper_0(message_2) {\n  log(message_2);\n}\n"
    );
}

#[test]
fn test_mode_from_configuration_name() {
    let mode: OutputMode = "pretty".parse().unwrap();
    assert!(optimize(MODULE, mode).contains("function helper(message)"));
    assert!(matches!(
        "minified".parse::<OutputMode>(),
        Err(OptimizeError::UnknownOutputMode(name)) if name == "minified"
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Renaming
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_free_globals_are_never_renamed() {
    assert_eq!(
        optimize(
            "function gwtOnLoad() { var doc = window.document; doc.title = \"t\"; }",
            OutputMode::Compact
        ),
        "function gwtOnLoad(){var a=window.document;a.title=\"t\";}"
    );
}

#[test]
fn test_inner_names_do_not_shadow_captured_outer_names() {
    assert_eq!(
        optimize(
            "function gwtOnLoad() { var outer = 1; return function (a) { return a + outer; }; }",
            OutputMode::Compact
        ),
        "function gwtOnLoad(){var a=1;return function(b){return b+a;};}"
    );
}

#[test]
fn test_catch_parameter_is_renamed() {
    assert_eq!(
        optimize(
            "function gwtOnLoad() { try { f(); } catch (e) { g(e); } }",
            OutputMode::Compact
        ),
        "function gwtOnLoad(){try{f();}catch(a){g(a);}}"
    );
}

#[test]
fn test_var_redeclaring_catch_parameter_keeps_one_name() {
    let source = "function gwtOnLoad() { try { a(); } catch (e) { var e = 2; b(e); } return e; }";
    assert_eq!(
        optimize(source, OutputMode::Compact),
        "function gwtOnLoad(){try{a();}catch(c){var c=2;b(c);}return c;}"
    );

    let pretty = optimize(source, OutputMode::Pretty);
    assert!(pretty.contains("catch (e) {"), "{pretty}");
    assert!(pretty.contains("var e = 2;"), "{pretty}");
    assert!(pretty.contains("b(e);"), "{pretty}");
    assert!(pretty.contains("return e;"), "{pretty}");
    assert!(!pretty.contains("e_0"), "{pretty}");
}

#[test]
fn test_catch_var_name_avoids_names_used_outside_the_clause() {
    assert_eq!(
        optimize(
            "function gwtOnLoad() { helper(); try { f(); } catch (e) { var e = 1; g(e); } }\n\
             function helper() {}",
            OutputMode::Compact
        ),
        "function gwtOnLoad(){a();try{f();}catch(b){var b=1;g(b);}}function a(){}"
    );
}

#[test]
fn test_named_function_expression() {
    assert_eq!(
        optimize(
            "var fact = function self(n) { return n ? n * self(n - 1) : 1; }; fact(3);",
            OutputMode::Compact
        ),
        "var a=function a(b){return b?b*a(b-1):1;};a(3);"
    );
}

#[test]
fn test_top_level_vars_are_renamed() {
    assert_eq!(
        optimize(
            "var counter = 0; function gwtOnLoad() { counter++; }",
            OutputMode::Compact
        ),
        "var a=0;function gwtOnLoad(){a++;}"
    );
}

#[test]
fn test_eval_freezes_names_and_functions() {
    let out = optimize_javascript(
        "perm0.js",
        "function gwtOnLoad() { var local = 1; eval(\"local\"); } function other() {}",
        ENTRY,
        OutputMode::Compact,
    )
    .unwrap();
    assert_eq!(
        out.js,
        "function gwtOnLoad(){var local=1;eval(\"local\");}function other(){}"
    );
    assert_eq!(out.stats.functions_removed, 0);
}

// ══════════════════════════════════════════════════════════════════════════════
// Statement ranges
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_statement_ranges() {
    let out = optimize_javascript("perm0.js", MODULE, ENTRY, OutputMode::Compact).unwrap();
    let ranges = &out.statement_ranges;
    assert_eq!(ranges.num_statements(), 2);
    assert_eq!(ranges.start(0), 0);
    assert_eq!(ranges.end(1), out.js.len());
    assert!(out.js[ranges.start(0)..ranges.end(0)].starts_with("function gwtOnLoad"));
    assert_eq!(
        &out.js[ranges.start(1)..ranges.end(1)],
        "function a(a){log(a);}"
    );
}

#[test]
fn test_optimized_output_reparses() {
    for mode in OutputMode::ALL {
        let js = optimize(MODULE, mode);
        assert!(parse_program("out.js", &js).is_ok(), "{mode} output: {js}");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_syntax_error_carries_location() {
    let err = optimize_javascript("perm7.js", "var a = 1;\nvar = 2;", ENTRY, OutputMode::Compact)
        .unwrap_err();
    let OptimizeError::Syntax { file, errors } = &err else {
        panic!("expected a syntax error, got {err:?}");
    };
    assert_eq!(file, "perm7.js");
    let first = errors.first().expect("an error");
    assert_eq!(first.file, "perm7.js");
    assert_eq!(first.span.start_line, 2);
    assert!(err.to_string().starts_with("cannot optimize perm7.js: perm7.js:2:"));
}

#[test]
fn test_rejected_constructs() {
    assert_eq!(syntax_error("var r = /a+/;"), ErrorCode::UNSUPPORTED_REGEXP);
    assert_eq!(syntax_error("with (o) { x(); }"), ErrorCode::UNSUPPORTED_WITH);
    assert_eq!(syntax_error("var f = (a) => a;"), ErrorCode::UNSUPPORTED_SYNTAX);
    assert_eq!(syntax_error("class A {}"), ErrorCode::UNSUPPORTED_SYNTAX);
    assert_eq!(
        syntax_error("var o = { get x() { return 1; } };"),
        ErrorCode::UNSUPPORTED_ACCESSOR
    );
}

#[test]
fn test_long_operator_chain_is_a_syntax_error() {
    let source = format!(
        "gwtOnLoad(); function gwtOnLoad() {{ return {}; }}",
        vec!["x"; 10_000].join(" + ")
    );
    assert_eq!(syntax_error(&source), ErrorCode::NESTING_LIMIT_EXCEEDED);
}

#[test]
fn test_operator_chain_within_limit_is_optimized() {
    let source = format!(
        "function gwtOnLoad() {{ return {}; }}",
        vec!["x"; 500].join(" + ")
    );
    let out = optimize(&source, OutputMode::Compact);
    assert!(out.starts_with("function gwtOnLoad(){return x+x+"), "{out}");
    assert_eq!(out.matches('x').count(), 500);
}

#[test]
fn test_empty_program() {
    let out = optimize_javascript("perm0.js", "", ENTRY, OutputMode::Compact).unwrap();
    assert_eq!(out.js, "");
    assert!(out.statement_ranges.is_empty());
}
