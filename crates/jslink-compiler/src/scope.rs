//! Scope tree with resolved bindings.
//!
//! [`ScopeTree`] is an arena of scopes and symbols. Scopes are created in
//! program order, so a parent always has a smaller [`ScopeId`] than its
//! children. Each scope also records which symbols and free names are
//! referenced directly inside it; the renamer uses those sets to avoid
//! shadowing.

use std::collections::{BTreeMap, BTreeSet};

use jslink_types::ast::{ScopeId, SymbolId};

// ══════════════════════════════════════════════════════════════════════════════
// Scope Kind
// ══════════════════════════════════════════════════════════════════════════════

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The program's top level.
    Global,
    /// A function body, holding its parameters, `var`s and nested function
    /// declarations.
    Function,
    /// The name of a named function expression, visible only inside it.
    FunctionName,
    /// A `catch (e)` clause, holding only `e`.
    Catch,
}

/// How a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Function,
    Param,
    CatchParam,
    FunctionName,
    /// The module entry point, registered before parsing.
    EntryPoint,
    /// A local introduced by string interning.
    Interned,
}

// ══════════════════════════════════════════════════════════════════════════════
// Scope & Symbol
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Declared names, in declaration order.
    pub symbols: Vec<SymbolId>,
    names: BTreeMap<String, SymbolId>,
    /// Symbols referenced directly in this scope.
    pub references: BTreeSet<SymbolId>,
    /// Unresolved names referenced directly in this scope.
    pub free_names: BTreeSet<String>,
    /// Set when code in this scope or below calls `eval` directly.
    pub dynamic: bool,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    /// Cleared for the entry point and for every binding visible to `eval`.
    pub renameable: bool,
    /// Set on a catch parameter redeclared by `var` inside its clause. The
    /// parameter must keep the same name as this function-scope symbol.
    pub shares_name_with: Option<SymbolId>,
}

// ══════════════════════════════════════════════════════════════════════════════
// ScopeTree
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl ScopeTree {
    /// A tree holding only the global scope, with `entry_point` declared in
    /// it and protected from renaming.
    pub fn new(entry_point: &str) -> Self {
        let mut tree = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
        };
        let global = tree.add_scope(ScopeKind::Global, None);
        if !entry_point.is_empty() {
            let id = tree.declare(global, entry_point, SymbolKind::EntryPoint);
            tree.symbols[id.0 as usize].renameable = false;
        }
        tree
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn add_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            symbols: Vec::new(),
            names: BTreeMap::new(),
            references: BTreeSet::new(),
            free_names: BTreeSet::new(),
            dynamic: false,
        });
        id
    }

    /// Declare `name` in `scope`. Redeclaring a name returns the existing
    /// symbol (`var a; var a;` is one binding).
    pub fn declare(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
        if let Some(&existing) = self.scope(scope).names.get(name) {
            return existing;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            scope,
            renameable: true,
            shares_name_with: None,
        });
        let s = self.scope_mut(scope);
        s.names.insert(name.to_string(), id);
        s.symbols.push(id);
        id
    }

    /// Resolve `name` from `scope` outwards.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if let Some(&symbol) = s.names.get(name) {
                return Some(symbol);
            }
            current = s.parent;
        }
        None
    }

    /// Look `name` up from `scope` and record the reference. Returns `None`
    /// for a free name.
    pub fn reference(&mut self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let resolved = self.lookup(scope, name);
        let s = self.scope_mut(scope);
        match resolved {
            Some(symbol) => {
                s.references.insert(symbol);
            }
            None => {
                s.free_names.insert(name.to_string());
            }
        }
        resolved
    }

    /// Tie `catch_param` to the hoisted `var` of the same name so both are
    /// printed with one name.
    pub fn share_name(&mut self, catch_param: SymbolId, var: SymbolId) {
        self.symbol_mut(catch_param).shares_name_with = Some(var);
    }

    /// Record an occurrence of an already-resolved symbol.
    pub fn note_reference(&mut self, scope: ScopeId, symbol: SymbolId) {
        self.scope_mut(scope).references.insert(symbol);
    }

    /// Record a reference to `symbol` in `scope` and every scope below it.
    pub fn reference_in_subtree(&mut self, scope: ScopeId, symbol: SymbolId) {
        for id in 0..self.scopes.len() {
            let id = ScopeId(id as u32);
            if self.is_within(id, scope) {
                self.scope_mut(id).references.insert(symbol);
            }
        }
    }

    /// Mark `scope` and all of its ancestors dynamic.
    pub fn mark_dynamic(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope_mut(id);
            s.dynamic = true;
            current = s.parent;
        }
    }

    /// Whether `scope` is `ancestor` or lies below it.
    pub fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scope(id).parent;
        }
        false
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// All scope ids, parents before children.
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len() as u32).map(ScopeId)
    }

    /// Every name the program mentions: declared or free.
    pub fn all_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.symbols.iter().map(|s| s.name.as_str()).collect();
        for scope in &self.scopes {
            names.extend(scope.free_names.iter().map(String::as_str));
        }
        names
    }

    /// Clear `renameable` on every symbol declared in a dynamic scope.
    pub fn freeze_dynamic_scopes(&mut self) {
        for scope in &self.scopes {
            if scope.dynamic {
                for &symbol in &scope.symbols {
                    self.symbols[symbol.0 as usize].renameable = false;
                }
            }
        }
    }
}
