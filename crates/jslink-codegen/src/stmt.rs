//! Statement and function printing.

use jslink_types::ast::*;

use crate::expr::{emit_expr, Prec};
use crate::parens::{contains_bare_in, ends_with_open_if, starts_with_function_or_brace};
use crate::printer::Printer;

/// Print one statement, without leading indentation or a trailing newline.
pub fn emit_stmt(stmt: &Stmt, p: &mut Printer) {
    match &stmt.kind {
        StmtKind::Empty => p.punct(";"),
        StmtKind::Block(body) => emit_block(body, p),
        StmtKind::Expr(expr) => {
            if starts_with_function_or_brace(expr) {
                p.punct("(");
                emit_expr(expr, Prec::Sequence, p);
                p.punct(")");
            } else {
                emit_expr(expr, Prec::Sequence, p);
            }
            p.punct(";");
        }
        StmtKind::Var(decl) => {
            emit_var_decl(decl, false, p);
            p.punct(";");
        }
        StmtKind::Function(func) => emit_function(func, p),
        StmtKind::Return(arg) => {
            p.word("return");
            if let Some(arg) = arg {
                p.space();
                emit_expr(arg, Prec::Sequence, p);
            }
            p.punct(";");
        }
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => emit_if(test, consequent, alternate.as_deref(), p),
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            p.word("for");
            p.space();
            p.punct("(");
            match init {
                Some(ForInit::Var(decl)) => emit_var_decl(decl, true, p),
                Some(ForInit::Expr(expr)) => emit_no_in(expr, Prec::Sequence, p),
                None => {}
            }
            p.punct(";");
            if let Some(test) = test {
                p.space();
                emit_expr(test, Prec::Sequence, p);
            }
            p.punct(";");
            if let Some(update) = update {
                p.space();
                emit_expr(update, Prec::Sequence, p);
            }
            p.punct(")");
            emit_body(body, p);
        }
        StmtKind::ForIn { left, right, body } => {
            p.word("for");
            p.space();
            p.punct("(");
            match left {
                ForInLeft::Var(kind, name) => {
                    p.word(kind.as_str());
                    p.word(&name.name);
                }
                ForInLeft::Expr(expr) => emit_expr(expr, Prec::Call, p),
            }
            p.binary_operator("in");
            emit_expr(right, Prec::Sequence, p);
            p.punct(")");
            emit_body(body, p);
        }
        StmtKind::While { test, body } => {
            p.word("while");
            p.space();
            emit_condition(test, p);
            emit_body(body, p);
        }
        StmtKind::DoWhile { body, test } => {
            p.word("do");
            emit_body(body, p);
            p.space();
            p.word("while");
            p.space();
            emit_condition(test, p);
            p.punct(";");
        }
        StmtKind::Break(label) => {
            p.word("break");
            if let Some(label) = label {
                p.word(label);
            }
            p.punct(";");
        }
        StmtKind::Continue(label) => {
            p.word("continue");
            if let Some(label) = label {
                p.word(label);
            }
            p.punct(";");
        }
        StmtKind::Throw(arg) => {
            p.word("throw");
            p.space();
            emit_expr(arg, Prec::Sequence, p);
            p.punct(";");
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            p.word("try");
            p.space();
            emit_block(block, p);
            if let Some(handler) = handler {
                p.space();
                p.word("catch");
                p.space();
                p.punct("(");
                p.word(&handler.param.name);
                p.punct(")");
                p.space();
                emit_block(&handler.body, p);
            }
            if let Some(finalizer) = finalizer {
                p.space();
                p.word("finally");
                p.space();
                emit_block(finalizer, p);
            }
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => emit_switch(discriminant, cases, p),
        StmtKind::Labeled { label, body } => {
            p.word(label);
            p.punct(":");
            p.space();
            emit_stmt(body, p);
        }
        StmtKind::Debugger => {
            p.word("debugger");
            p.punct(";");
        }
    }
}

/// Print a function declaration or expression.
pub fn emit_function(func: &Function, p: &mut Printer) {
    p.word("function");
    if let Some(name) = &func.name {
        p.word(&name.name);
    }
    p.punct("(");
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            p.comma();
        }
        p.word(&param.name);
    }
    p.punct(")");
    p.space();
    emit_block(&func.body, p);
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// `{ ... }` with one statement per line in pretty output.
fn emit_block(body: &[Stmt], p: &mut Printer) {
    p.punct("{");
    if body.is_empty() {
        p.punct("}");
        return;
    }
    p.end_line();
    p.indent();
    emit_lines(body, p);
    p.dedent();
    p.begin_line();
    p.punct("}");
}

fn emit_lines(body: &[Stmt], p: &mut Printer) {
    for stmt in body {
        p.begin_line();
        emit_stmt(stmt, p);
        p.end_line();
    }
}

/// The body of a loop or `if` branch.
fn emit_body(body: &Stmt, p: &mut Printer) {
    p.space();
    emit_stmt(body, p);
}

fn emit_condition(test: &Expr, p: &mut Printer) {
    p.punct("(");
    emit_expr(test, Prec::Sequence, p);
    p.punct(")");
}

fn emit_if(test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>, p: &mut Printer) {
    p.word("if");
    p.space();
    emit_condition(test, p);
    match alternate {
        Some(alternate) => {
            if ends_with_open_if(consequent) {
                // braces keep the `else` attached to this `if`
                p.space();
                emit_block(std::slice::from_ref(consequent), p);
            } else {
                emit_body(consequent, p);
            }
            p.space();
            p.word("else");
            emit_body(alternate, p);
        }
        None => emit_body(consequent, p),
    }
}

fn emit_var_decl(decl: &VarDecl, no_in: bool, p: &mut Printer) {
    p.word(decl.kind.as_str());
    for (i, declarator) in decl.declarators.iter().enumerate() {
        if i > 0 {
            p.comma();
        } else {
            p.space();
        }
        p.word(&declarator.name.name);
        if let Some(init) = &declarator.init {
            p.binary_operator("=");
            if no_in {
                emit_no_in(init, Prec::Assign, p);
            } else {
                emit_expr(init, Prec::Assign, p);
            }
        }
    }
}

/// An expression in a `for (init; ...)` head, where a bare `in` would
/// turn the loop into `for-in`.
fn emit_no_in(expr: &Expr, min: Prec, p: &mut Printer) {
    if contains_bare_in(expr) {
        p.punct("(");
        emit_expr(expr, Prec::Sequence, p);
        p.punct(")");
    } else {
        emit_expr(expr, min, p);
    }
}

fn emit_switch(discriminant: &Expr, cases: &[SwitchCase], p: &mut Printer) {
    p.word("switch");
    p.space();
    emit_condition(discriminant, p);
    p.space();
    p.punct("{");
    p.end_line();
    p.indent();
    for case in cases {
        p.begin_line();
        match &case.test {
            Some(test) => {
                p.word("case");
                p.space();
                emit_expr(test, Prec::Sequence, p);
            }
            None => p.word("default"),
        }
        p.punct(":");
        p.end_line();
        p.indent();
        emit_lines(&case.body, p);
        p.dedent();
    }
    p.dedent();
    p.begin_line();
    p.punct("}");
}
