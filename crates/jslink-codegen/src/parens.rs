//! Syntactic positions where precedence alone does not decide parentheses.

use jslink_types::ast::*;

/// Digits only: `5.x` would read the dot as a decimal point.
pub fn is_plain_integer(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// `new f().g()` would call `f` with `new`, so a callee whose member chain
/// contains a call must be parenthesised as a whole.
pub fn new_callee_needs_parens(callee: &Expr) -> bool {
    match &callee.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => {
            new_callee_needs_parens(object)
        }
        _ => false,
    }
}

/// Whether the printed expression would begin with `function` or `{`,
/// which would make an expression statement read as a declaration or block.
pub fn starts_with_function_or_brace(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Function(_) | ExprKind::Object(_) => true,
        ExprKind::Binary { left, .. } => starts_with_function_or_brace(left),
        ExprKind::Assign { target, .. } => starts_with_function_or_brace(target),
        ExprKind::Conditional { test, .. } => starts_with_function_or_brace(test),
        ExprKind::Call { callee, .. } => starts_with_function_or_brace(callee),
        ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => {
            starts_with_function_or_brace(object)
        }
        ExprKind::Update {
            prefix: false, arg, ..
        } => starts_with_function_or_brace(arg),
        ExprKind::Sequence(exprs) => exprs.first().is_some_and(starts_with_function_or_brace),
        _ => false,
    }
}

/// Whether an `in` operator would appear unparenthesised in the printed
/// text of `expr`. Used for `for (init; ...)` heads.
pub fn contains_bare_in(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op, left, right } => {
            *op == BinaryOp::In || contains_bare_in(left) || contains_bare_in(right)
        }
        ExprKind::Assign { target, value, .. } => {
            contains_bare_in(target) || contains_bare_in(value)
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => contains_bare_in(test) || contains_bare_in(consequent) || contains_bare_in(alternate),
        ExprKind::Sequence(exprs) => exprs.iter().any(contains_bare_in),
        ExprKind::Unary { arg, .. } | ExprKind::Update { arg, .. } => contains_bare_in(arg),
        ExprKind::Call { callee, .. } | ExprKind::New { callee, .. } => contains_bare_in(callee),
        ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => {
            contains_bare_in(object)
        }
        // brackets, braces and argument lists reset the restriction
        _ => false,
    }
}

/// Whether `stmt` ends in an `if` without `else`, which would capture an
/// `else` printed after it.
pub fn ends_with_open_if(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::If {
            alternate: None, ..
        } => true,
        StmtKind::If {
            alternate: Some(alt),
            ..
        } => ends_with_open_if(alt),
        StmtKind::For { body, .. }
        | StmtKind::ForIn { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::Labeled { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jslink_types::Span;

    fn e(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::default())
    }

    fn ident(name: &str) -> Expr {
        e(ExprKind::Ident(Ident::new(name, Span::default())))
    }

    #[test]
    fn test_plain_integer() {
        assert!(is_plain_integer("10"));
        assert!(!is_plain_integer("1.5"));
        assert!(!is_plain_integer("1e3"));
        assert!(!is_plain_integer("0x1"));
    }

    #[test]
    fn test_new_callee_with_call_in_chain() {
        let call = e(ExprKind::Call {
            callee: Box::new(ident("f")),
            args: vec![],
        });
        let member = e(ExprKind::Member {
            object: Box::new(call),
            property: "g".into(),
        });
        assert!(new_callee_needs_parens(&member));
        assert!(!new_callee_needs_parens(&ident("F")));
    }

    #[test]
    fn test_statement_start_through_call() {
        let func = e(ExprKind::Function(Box::new(Function {
            name: None,
            params: vec![],
            body: vec![],
            span: Span::default(),
            scope: None,
        })));
        let call = e(ExprKind::Call {
            callee: Box::new(func),
            args: vec![],
        });
        assert!(starts_with_function_or_brace(&call));
        assert!(!starts_with_function_or_brace(&ident("x")));
    }
}
