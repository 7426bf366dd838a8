//! Mutable AST traversal.
//!
//! Implement [`VisitMut`] and override the hooks you care about; call the
//! matching `walk_*` function from an override to keep descending.

use crate::ast::*;

pub trait VisitMut {
    fn visit_program(&mut self, program: &mut Program) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, func: &mut Function) {
        walk_function(self, func);
    }

    /// Called for every binding and reference identifier, including
    /// function names and parameters.
    fn visit_ident(&mut self, _ident: &mut Ident) {}
}

pub fn walk_program<V: VisitMut + ?Sized>(v: &mut V, program: &mut Program) {
    for stmt in &mut program.body {
        v.visit_stmt(stmt);
    }
}

pub fn walk_function<V: VisitMut + ?Sized>(v: &mut V, func: &mut Function) {
    if let Some(name) = &mut func.name {
        v.visit_ident(name);
    }
    for param in &mut func.params {
        v.visit_ident(param);
    }
    for stmt in &mut func.body {
        v.visit_stmt(stmt);
    }
}

fn walk_var_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    for declarator in &mut decl.declarators {
        v.visit_ident(&mut declarator.name);
        if let Some(init) = &mut declarator.init {
            v.visit_expr(init);
        }
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Empty | StmtKind::Debugger | StmtKind::Break(_) | StmtKind::Continue(_) => {}
        StmtKind::Block(body) => {
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::Expr(expr) | StmtKind::Throw(expr) => v.visit_expr(expr),
        StmtKind::Var(decl) => walk_var_decl(v, decl),
        StmtKind::Function(func) => v.visit_function(func),
        StmtKind::Return(arg) => {
            if let Some(arg) = arg {
                v.visit_expr(arg);
            }
        }
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_stmt(consequent);
            if let Some(alt) = alternate {
                v.visit_stmt(alt);
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => walk_var_decl(v, decl),
                Some(ForInit::Expr(expr)) => v.visit_expr(expr),
                None => {}
            }
            if let Some(test) = test {
                v.visit_expr(test);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        StmtKind::ForIn { left, right, body } => {
            match left {
                ForInLeft::Var(_, ident) => v.visit_ident(ident),
                ForInLeft::Expr(expr) => v.visit_expr(expr),
            }
            v.visit_expr(right);
            v.visit_stmt(body);
        }
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            v.visit_expr(test);
            v.visit_stmt(body);
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            for s in block {
                v.visit_stmt(s);
            }
            if let Some(handler) = handler {
                v.visit_ident(&mut handler.param);
                for s in &mut handler.body {
                    v.visit_stmt(s);
                }
            }
            if let Some(finalizer) = finalizer {
                for s in finalizer {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            v.visit_expr(discriminant);
            for case in cases {
                if let Some(test) = &mut case.test {
                    v.visit_expr(test);
                }
                for s in &mut case.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Labeled { body, .. } => v.visit_stmt(body),
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Ident(ident) => v.visit_ident(ident),
        ExprKind::This
        | ExprKind::Null
        | ExprKind::Bool(_)
        | ExprKind::Number(_)
        | ExprKind::String(_) => {}
        ExprKind::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                v.visit_expr(element);
            }
        }
        ExprKind::Object(props) => {
            for prop in props {
                v.visit_expr(&mut prop.value);
            }
        }
        ExprKind::Function(func) => v.visit_function(func),
        ExprKind::Unary { arg, .. } | ExprKind::Update { arg, .. } => v.visit_expr(arg),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_expr(consequent);
            v.visit_expr(alternate);
        }
        ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Member { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        ExprKind::Sequence(exprs) => {
            for e in exprs {
                v.visit_expr(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    struct Collect(Vec<String>);

    impl VisitMut for Collect {
        fn visit_ident(&mut self, ident: &mut Ident) {
            self.0.push(ident.name.clone());
        }
    }

    fn ident_expr(name: &str) -> Expr {
        Expr::new(ExprKind::Ident(Ident::new(name, Span::default())), Span::default())
    }

    #[test]
    fn visits_bindings_and_references_in_order() {
        let func = Function {
            name: Some(Ident::new("f", Span::default())),
            params: vec![Ident::new("a", Span::default())],
            body: vec![Stmt::new(
                StmtKind::Return(Some(Expr::new(
                    ExprKind::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(ident_expr("a")),
                        right: Box::new(ident_expr("g")),
                    },
                    Span::default(),
                ))),
                Span::default(),
            )],
            span: Span::default(),
            scope: None,
        };
        let mut program = Program {
            body: vec![Stmt::new(StmtKind::Function(func), Span::default())],
            span: Span::default(),
        };
        let mut collect = Collect(Vec::new());
        collect.visit_program(&mut program);
        assert_eq!(collect.0, vec!["f", "a", "a", "g"]);
    }

    #[test]
    fn member_property_names_are_not_identifiers() {
        let mut expr = Expr::new(
            ExprKind::Member {
                object: Box::new(ident_expr("obj")),
                property: "field".to_string(),
            },
            Span::default(),
        );
        let mut collect = Collect(Vec::new());
        collect.visit_expr(&mut expr);
        assert_eq!(collect.0, vec!["obj"]);
    }
}
