//! Scope resolution: binds every identifier to its declaration.
//!
//! Scoping is function-level. Each function body is resolved in two steps:
//! first its `var`/`let`/`const` names and nested function declarations are
//! hoisted into the function scope, then every identifier in the body is
//! resolved outwards through the enclosing scopes. A `catch` clause gets a
//! scope holding only its parameter; a named function expression gets a
//! scope holding only its name. A `var` inside `catch (e)` that redeclares
//! `e` assigns the parameter, so its declarator binds to the parameter and
//! the two symbols share one name. Names that resolve nowhere stay free and
//! are never renamed.
//!
//! A direct call to a free `eval` marks its scope and every enclosing scope
//! dynamic; bindings in dynamic scopes keep their names.

use jslink_types::ast::*;
use jslink_types::visit::{walk_expr, walk_stmt, VisitMut};

use crate::scope::{ScopeKind, ScopeTree, SymbolKind};

/// Resolve `program` against `tree`, whose global scope may already hold
/// the entry point.
pub fn resolve_program(program: &mut Program, tree: &mut ScopeTree) {
    let global = tree.global();
    let mut resolver = Resolver {
        tree,
        scope: global,
        var_scope: global,
    };
    resolver.hoist(&mut program.body);
    for stmt in &mut program.body {
        resolver.visit_stmt(stmt);
    }
    tree.freeze_dynamic_scopes();
}

struct Resolver<'a> {
    tree: &'a mut ScopeTree,
    /// Innermost scope, used for lookups.
    scope: ScopeId,
    /// Nearest function (or global) scope, where declarations land.
    var_scope: ScopeId,
}

impl Resolver<'_> {
    // ── Hoisting ─────────────────────────────────────────────────────────────

    fn hoist(&mut self, body: &mut [Stmt]) {
        for stmt in body {
            self.hoist_stmt(stmt);
        }
    }

    fn hoist_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Var(decl) => self.hoist_var_decl(decl),
            StmtKind::Function(func) => {
                if let Some(name) = &mut func.name {
                    name.symbol =
                        Some(self.tree.declare(self.var_scope, &name.name, SymbolKind::Function));
                }
            }
            StmtKind::Block(body) => self.hoist(body),
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                self.hoist_stmt(consequent);
                if let Some(alt) = alternate {
                    self.hoist_stmt(alt);
                }
            }
            StmtKind::For { init, body, .. } => {
                if let Some(ForInit::Var(decl)) = init {
                    self.hoist_var_decl(decl);
                }
                self.hoist_stmt(body);
            }
            StmtKind::ForIn { left, body, .. } => {
                if let ForInLeft::Var(_, name) = left {
                    name.symbol = Some(self.tree.declare(self.var_scope, &name.name, SymbolKind::Var));
                }
                self.hoist_stmt(body);
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => self.hoist_stmt(body),
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.hoist(block);
                if let Some(handler) = handler {
                    self.hoist(&mut handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.hoist(finalizer);
                }
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    self.hoist(&mut case.body);
                }
            }
            StmtKind::Empty
            | StmtKind::Expr(_)
            | StmtKind::Return(_)
            | StmtKind::Break(_)
            | StmtKind::Continue(_)
            | StmtKind::Throw(_)
            | StmtKind::Debugger => {}
        }
    }

    fn hoist_var_decl(&mut self, decl: &mut VarDecl) {
        for declarator in &mut decl.declarators {
            let name = &mut declarator.name;
            name.symbol = Some(self.tree.declare(self.var_scope, &name.name, SymbolKind::Var));
        }
    }

    // ── Scopes ───────────────────────────────────────────────────────────────

    fn resolve_catch(&mut self, handler: &mut CatchClause) {
        let saved = self.scope;
        let catch_scope = self.tree.add_scope(ScopeKind::Catch, Some(self.scope));
        handler.scope = Some(catch_scope);
        handler.param.symbol =
            Some(self.tree.declare(catch_scope, &handler.param.name, SymbolKind::CatchParam));
        self.scope = catch_scope;
        for stmt in &mut handler.body {
            self.visit_stmt(stmt);
        }
        self.scope = saved;
    }

    fn bind_declarators(&mut self, decl: &mut VarDecl) {
        for declarator in &mut decl.declarators {
            self.bind_declared(&mut declarator.name);
        }
    }

    /// Rebind a hoisted declarator to the binding visible where it appears.
    fn bind_declared(&mut self, name: &mut Ident) {
        let Some(hoisted) = name.symbol else {
            return;
        };
        let Some(visible) = self.tree.lookup(self.scope, &name.name) else {
            return;
        };
        if visible != hoisted {
            self.tree.share_name(visible, hoisted);
            name.symbol = Some(visible);
        }
    }

    fn is_direct_eval(&self, callee: &Expr) -> bool {
        match &callee.kind {
            ExprKind::Ident(ident) => {
                ident.name == "eval" && self.tree.lookup(self.scope, "eval").is_none()
            }
            _ => false,
        }
    }
}

impl VisitMut for Resolver<'_> {
    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                for s in block {
                    self.visit_stmt(s);
                }
                if let Some(handler) = handler {
                    self.resolve_catch(handler);
                }
                if let Some(finalizer) = finalizer {
                    for s in finalizer {
                        self.visit_stmt(s);
                    }
                }
                return;
            }
            StmtKind::Var(decl)
            | StmtKind::For {
                init: Some(ForInit::Var(decl)),
                ..
            } => self.bind_declarators(decl),
            StmtKind::ForIn {
                left: ForInLeft::Var(_, name),
                ..
            } => self.bind_declared(name),
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        if let ExprKind::Call { callee, .. } = &expr.kind {
            if self.is_direct_eval(callee) {
                self.tree.mark_dynamic(self.scope);
            }
        }
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, func: &mut Function) {
        let (saved_scope, saved_var_scope) = (self.scope, self.var_scope);

        if let Some(name) = &mut func.name {
            match name.symbol {
                // declarations were bound while hoisting
                Some(symbol) => self.tree.note_reference(self.scope, symbol),
                None => {
                    let name_scope = self.tree.add_scope(ScopeKind::FunctionName, Some(self.scope));
                    name.symbol =
                        Some(self.tree.declare(name_scope, &name.name, SymbolKind::FunctionName));
                    self.scope = name_scope;
                }
            }
        }

        let function_scope = self.tree.add_scope(ScopeKind::Function, Some(self.scope));
        func.scope = Some(function_scope);
        for param in &mut func.params {
            param.symbol = Some(self.tree.declare(function_scope, &param.name, SymbolKind::Param));
        }
        self.scope = function_scope;
        self.var_scope = function_scope;
        self.hoist(&mut func.body);
        for stmt in &mut func.body {
            self.visit_stmt(stmt);
        }

        self.scope = saved_scope;
        self.var_scope = saved_var_scope;
    }

    fn visit_ident(&mut self, ident: &mut Ident) {
        match ident.symbol {
            Some(symbol) => self.tree.note_reference(self.scope, symbol),
            None => ident.symbol = self.tree.reference(self.scope, &ident.name),
        }
    }
}
