//! Symbol renaming.
//!
//! Scopes are named top-down, so when a scope is reached every enclosing
//! scope already has its final names. A new name for a symbol declared in
//! scope `S` must not capture anything code under `S` refers to:
//!
//! - free names referenced anywhere under `S`,
//! - final names of outer symbols referenced anywhere under `S`,
//! - names of frozen (non-renameable) symbols declared under `S`,
//! - reserved words and names with special meaning,
//! - names already given to other symbols of `S`.
//!
//! A catch parameter redeclared by `var` in its clause takes the name of the
//! function-scope symbol it shares with.

use std::collections::BTreeSet;

use jslink_types::ast::*;
use jslink_types::visit::VisitMut;
use tracing::debug;

use crate::dce::SymbolRefs;
use crate::scope::ScopeTree;

/// How new names are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Shortest available names: `a`, `b`, ..., `aa`, ...
    Obfuscated,
    /// Original names, suffixed `_N` only when they would conflict.
    Pretty,
    /// `<original>_<N>` with a program-wide counter.
    Verbose,
}

/// Rename every renameable symbol that still occurs in `program`. Returns
/// the number of symbols whose name changed.
pub fn rename_symbols(program: &mut Program, tree: &ScopeTree, strategy: NamingStrategy) -> usize {
    let mut live = SymbolRefs::default();
    live.visit_program(program);
    let mut live = live.0;
    let shared: Vec<SymbolId> = live
        .iter()
        .filter_map(|&s| tree.symbol(s).shares_name_with)
        .collect();
    live.extend(shared);

    let below = Subtrees::collect(tree);
    let mut names: Vec<String> = (0..tree.symbol_count())
        .map(|i| tree.symbol(SymbolId(i as u32)).name.clone())
        .collect();
    let mut verbose_counter = 0usize;
    let mut renamed = 0;

    for scope_id in tree.scope_ids() {
        let scope = tree.scope(scope_id);
        let i = scope_id.0 as usize;

        let mut forbidden: BTreeSet<String> = below.free[i].clone();
        forbidden.extend(below.frozen[i].iter().cloned());
        for &r in &below.refs[i] {
            let declared_in = tree.symbol(r).scope;
            if declared_in != scope_id && tree.is_within(scope_id, declared_in) {
                forbidden.insert(names[r.0 as usize].clone());
            }
        }

        let mut used_here: BTreeSet<String> = BTreeSet::new();
        let mut next_short = 0usize;
        for &symbol_id in &scope.symbols {
            let symbol = tree.symbol(symbol_id);
            if let Some(var) = symbol.shares_name_with {
                let name = names[var.0 as usize].clone();
                if name != symbol.name {
                    renamed += 1;
                }
                used_here.insert(name.clone());
                names[symbol_id.0 as usize] = name;
                continue;
            }
            if !symbol.renameable || !live.contains(&symbol_id) {
                used_here.insert(symbol.name.clone());
                continue;
            }
            let available = |name: &str| {
                !is_reserved(name) && !forbidden.contains(name) && !used_here.contains(name)
            };
            let name = match strategy {
                NamingStrategy::Obfuscated => loop {
                    let candidate = short_name(next_short);
                    next_short += 1;
                    if available(&candidate) {
                        break candidate;
                    }
                },
                NamingStrategy::Pretty => {
                    if available(&symbol.name) {
                        symbol.name.clone()
                    } else {
                        (0..)
                            .map(|n| format!("{}_{n}", symbol.name))
                            .find(|candidate| available(candidate))
                            .unwrap_or_else(|| symbol.name.clone())
                    }
                }
                NamingStrategy::Verbose => loop {
                    let candidate = format!("{}_{verbose_counter}", symbol.name);
                    verbose_counter += 1;
                    if available(&candidate) {
                        break candidate;
                    }
                },
            };
            if name != symbol.name {
                renamed += 1;
            }
            used_here.insert(name.clone());
            names[symbol_id.0 as usize] = name;
        }
    }

    Apply { names: &names }.visit_program(program);
    debug!(?strategy, renamed, "renamed symbols");
    renamed
}

struct Apply<'a> {
    names: &'a [String],
}

impl VisitMut for Apply<'_> {
    fn visit_ident(&mut self, ident: &mut Ident) {
        if let Some(symbol) = ident.symbol {
            if let Some(name) = self.names.get(symbol.0 as usize) {
                if *name != ident.name {
                    ident.name = name.clone();
                }
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Subtree summaries
// ══════════════════════════════════════════════════════════════════════════════

/// Per-scope unions over the scope and everything below it.
struct Subtrees {
    free: Vec<BTreeSet<String>>,
    refs: Vec<BTreeSet<SymbolId>>,
    frozen: Vec<BTreeSet<String>>,
}

impl Subtrees {
    fn collect(tree: &ScopeTree) -> Self {
        let n = tree.scope_count();
        let mut free = Vec::with_capacity(n);
        let mut refs = Vec::with_capacity(n);
        let mut frozen = Vec::with_capacity(n);
        for id in tree.scope_ids() {
            let scope = tree.scope(id);
            free.push(scope.free_names.clone());
            refs.push(scope.references.clone());
            frozen.push(
                scope
                    .symbols
                    .iter()
                    .map(|&s| tree.symbol(s))
                    .filter(|s| !s.renameable)
                    .map(|s| s.name.clone())
                    .collect::<BTreeSet<_>>(),
            );
        }
        // children always follow their parent
        for id in tree.scope_ids().collect::<Vec<_>>().into_iter().rev() {
            if let Some(parent) = tree.scope(id).parent {
                let (i, p) = (id.0 as usize, parent.0 as usize);
                let child_free = free[i].clone();
                free[p].extend(child_free);
                let child_refs = refs[i].clone();
                refs[p].extend(child_refs);
                let child_frozen = frozen[i].clone();
                frozen[p].extend(child_frozen);
            }
        }
        Self { free, refs, frozen }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Names
// ══════════════════════════════════════════════════════════════════════════════

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";
const NEXT_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_0123456789";

/// The `n`th name in shortest-first order.
pub fn short_name(n: usize) -> String {
    let mut name = String::new();
    name.push(FIRST_CHARS[n % FIRST_CHARS.len()] as char);
    let mut rest = n / FIRST_CHARS.len();
    while rest > 0 {
        rest -= 1;
        name.push(NEXT_CHARS[rest % NEXT_CHARS.len()] as char);
        rest /= NEXT_CHARS.len();
    }
    name
}

/// Words that can never name a binding, plus globals with special meaning.
const RESERVED: &[&str] = &[
    "abstract", "arguments", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "debugger", "default", "delete", "do", "double", "else", "enum", "eval",
    "export", "extends", "false", "final", "finally", "float", "for", "function", "goto", "if",
    "implements", "import", "in", "Infinity", "instanceof", "int", "interface", "let", "long",
    "NaN", "native", "new", "null", "package", "private", "protected", "public", "return",
    "short", "static", "super", "switch", "synchronized", "this", "throw", "throws", "transient",
    "true", "try", "typeof", "undefined", "var", "void", "volatile", "while", "with", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names_are_unique_and_ordered() {
        assert_eq!(short_name(0), "a");
        assert_eq!(short_name(25), "z");
        assert_eq!(short_name(53), "_");
        assert_eq!(short_name(54), "aa");
        assert_eq!(short_name(55), "ba");
        let names: BTreeSet<String> = (0..10_000).map(short_name).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("do"));
        assert!(is_reserved("in"));
        assert!(is_reserved("arguments"));
        assert!(!is_reserved("a"));
    }
}
