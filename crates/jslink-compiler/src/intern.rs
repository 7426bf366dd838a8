//! String interning.
//!
//! Within each top-level function, a string literal that occurs at least
//! twice is replaced by a reference to a fresh local, declared by a single
//! `var` statement at the head of the function (after its directive
//! prologue). Directive strings such as `"use strict"` are never touched.

use std::collections::{BTreeMap, BTreeSet};

use jslink_types::ast::*;
use jslink_types::visit::{walk_expr, VisitMut};
use jslink_types::Span;
use tracing::trace;

use crate::scope::{ScopeTree, SymbolKind};

const INTERN_PREFIX: &str = "$intern_";

/// Intern repeated strings in every top-level function. Returns the number
/// of distinct strings interned.
pub fn intern_strings(program: &mut Program, tree: &mut ScopeTree) -> usize {
    let mut namer = InternNamer {
        taken: tree.all_names().into_iter().map(str::to_string).collect(),
        next: 0,
    };
    let mut interned = 0;
    for stmt in &mut program.body {
        if let StmtKind::Function(func) = &mut stmt.kind {
            interned += intern_function(func, tree, &mut namer);
        }
    }
    interned
}

struct InternNamer {
    taken: BTreeSet<String>,
    next: usize,
}

impl InternNamer {
    fn fresh(&mut self) -> String {
        loop {
            let name = format!("{INTERN_PREFIX}{}", self.next);
            self.next += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

fn intern_function(func: &mut Function, tree: &mut ScopeTree, namer: &mut InternNamer) -> usize {
    let Some(scope) = func.scope else {
        return 0;
    };

    let mut counter = Counter::default();
    counter.visit_function(func);
    let repeated: Vec<String> = counter
        .order
        .into_iter()
        .filter(|value| counter.counts.get(value).is_some_and(|&n| n >= 2))
        .collect();
    if repeated.is_empty() {
        return 0;
    }

    let mut replacements = BTreeMap::new();
    let mut declarators = Vec::with_capacity(repeated.len());
    for value in repeated {
        let name = namer.fresh();
        let symbol = tree.declare(scope, &name, SymbolKind::Interned);
        tree.reference_in_subtree(scope, symbol);
        trace!(name = %name, value = %value, "interned string");
        let mut ident = Ident::new(name, func.span);
        ident.symbol = Some(symbol);
        declarators.push(VarDeclarator {
            name: ident.clone(),
            init: Some(Expr::new(ExprKind::String(value.clone()), func.span)),
        });
        replacements.insert(value, ident);
    }

    let count = declarators.len();
    Replacer {
        replacements: &replacements,
    }
    .visit_function(func);

    let decl = Stmt::new(
        StmtKind::Var(VarDecl {
            kind: VarKind::Var,
            declarators,
        }),
        Span::point(func.span.start_line, func.span.start_col),
    );
    let at = directive_count(&func.body);
    func.body.insert(at, decl);
    count
}

/// Length of the directive prologue.
fn directive_count(body: &[Stmt]) -> usize {
    body.iter().take_while(|s| s.as_directive().is_some()).count()
}

// ══════════════════════════════════════════════════════════════════════════════
// Visitors
// ══════════════════════════════════════════════════════════════════════════════

/// Visit a function body, skipping its directive prologue.
fn walk_body_without_directives<V: VisitMut>(v: &mut V, func: &mut Function) {
    let skip = directive_count(&func.body);
    for stmt in func.body.iter_mut().skip(skip) {
        v.visit_stmt(stmt);
    }
}

#[derive(Default)]
struct Counter {
    counts: BTreeMap<String, usize>,
    /// Distinct values in first-occurrence order.
    order: Vec<String>,
}

impl VisitMut for Counter {
    fn visit_function(&mut self, func: &mut Function) {
        walk_body_without_directives(self, func);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::String(value) = &expr.kind {
            let count = self.counts.entry(value.clone()).or_insert(0);
            if *count == 0 {
                self.order.push(value.clone());
            }
            *count += 1;
        } else {
            walk_expr(self, expr);
        }
    }
}

struct Replacer<'a> {
    replacements: &'a BTreeMap<String, Ident>,
}

impl VisitMut for Replacer<'_> {
    fn visit_function(&mut self, func: &mut Function) {
        walk_body_without_directives(self, func);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::String(value) = &expr.kind {
            if let Some(ident) = self.replacements.get(value) {
                expr.kind = ExprKind::Ident(ident.clone());
            }
        } else {
            walk_expr(self, expr);
        }
    }
}
