//! Removal of unreachable top-level function declarations.
//!
//! Roots are every top-level statement that is not a function declaration,
//! plus the entry point. A function is kept when a kept statement or a kept
//! function refers to it. When the global scope is dynamic every function
//! is kept.

use std::collections::BTreeSet;

use jslink_types::ast::*;
use jslink_types::visit::VisitMut;
use tracing::debug;

use crate::scope::{ScopeTree, SymbolKind};

/// Symbols mentioned anywhere under a node.
#[derive(Default)]
pub(crate) struct SymbolRefs(pub(crate) BTreeSet<SymbolId>);

impl VisitMut for SymbolRefs {
    fn visit_ident(&mut self, ident: &mut Ident) {
        if let Some(symbol) = ident.symbol {
            self.0.insert(symbol);
        }
    }
}

/// Remove unreachable top-level function declarations. Returns how many
/// statements were removed.
pub fn remove_unused_functions(program: &mut Program, tree: &ScopeTree) -> usize {
    if tree.scope(tree.global()).dynamic {
        debug!("global scope calls eval; keeping every function");
        return 0;
    }

    // Symbol each top-level declaration binds, with what its body mentions.
    let mut declared: Vec<Option<SymbolId>> = Vec::with_capacity(program.body.len());
    let mut mentions: Vec<BTreeSet<SymbolId>> = Vec::with_capacity(program.body.len());
    for stmt in &mut program.body {
        let mut refs = SymbolRefs::default();
        refs.visit_stmt(stmt);
        declared.push(function_symbol(stmt));
        mentions.push(refs.0);
    }

    let mut reached: BTreeSet<SymbolId> = BTreeSet::new();
    let mut worklist: Vec<usize> = Vec::new();
    for (i, symbol) in declared.iter().enumerate() {
        let is_root = match symbol {
            None => true,
            Some(symbol) => tree.symbol(*symbol).kind == SymbolKind::EntryPoint,
        };
        if is_root {
            worklist.push(i);
        }
    }

    let mut visited = vec![false; declared.len()];
    while let Some(i) = worklist.pop() {
        if std::mem::replace(&mut visited[i], true) {
            continue;
        }
        for &symbol in &mentions[i] {
            if reached.insert(symbol) {
                // every declaration of a reached name is kept
                for (j, other) in declared.iter().enumerate() {
                    if *other == Some(symbol) && !visited[j] {
                        worklist.push(j);
                    }
                }
            }
        }
    }

    let before = program.body.len();
    let mut index = 0;
    program.body.retain(|_| {
        let keep = visited[index];
        index += 1;
        keep
    });
    let removed = before - program.body.len();
    debug!(removed, kept = program.body.len(), "removed unreachable functions");
    removed
}

fn function_symbol(stmt: &Stmt) -> Option<SymbolId> {
    stmt.as_function_decl()
        .and_then(|func| func.name.as_ref())
        .and_then(|name| name.symbol)
}
