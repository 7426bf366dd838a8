//! Tree height of parsed expressions.
//!
//! Operator, call and member chains are parsed in loops and grow left-deep
//! trees. Every later pass walks those trees recursively, so a chain's height
//! is tracked as it is built and capped at [`MAX_CHAIN_HEIGHT`].

use jslink_types::ast::*;

/// Tallest operator, call or member chain accepted.
pub(crate) const MAX_CHAIN_HEIGHT: u32 = 1000;

pub(crate) fn expr_height(expr: &Expr) -> u32 {
    let below = match &expr.kind {
        ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Null
        | ExprKind::Bool(_)
        | ExprKind::Number(_)
        | ExprKind::String(_) => 0,
        ExprKind::Array(elements) => max_of(elements.iter().flatten().map(expr_height)),
        ExprKind::Object(props) => max_of(props.iter().map(|p| expr_height(&p.value))),
        ExprKind::Function(func) => body_height(&func.body),
        ExprKind::Unary { arg, .. } | ExprKind::Update { arg, .. } => expr_height(arg),
        ExprKind::Binary { left, right, .. } => expr_height(left).max(expr_height(right)),
        ExprKind::Assign { target, value, .. } => expr_height(target).max(expr_height(value)),
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => expr_height(test)
            .max(expr_height(consequent))
            .max(expr_height(alternate)),
        ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
            expr_height(callee).max(max_of(args.iter().map(expr_height)))
        }
        ExprKind::Member { object, .. } => expr_height(object),
        ExprKind::Index { object, index } => expr_height(object).max(expr_height(index)),
        ExprKind::Sequence(exprs) => max_of(exprs.iter().map(expr_height)),
    };
    below + 1
}

/// Height of `link`, a chain node whose chained operand (`left`, `callee`
/// or `object`) is `spine` tall. Only the other operands are measured.
pub(crate) fn link_height(link: &Expr, spine: u32) -> u32 {
    let below = match &link.kind {
        ExprKind::Binary { right, .. } => spine.max(expr_height(right)),
        ExprKind::Call { args, .. } => spine.max(max_of(args.iter().map(expr_height))),
        ExprKind::Member { .. } => spine,
        ExprKind::Index { index, .. } => spine.max(expr_height(index)),
        _ => return expr_height(link),
    };
    below + 1
}

fn body_height(body: &[Stmt]) -> u32 {
    max_of(body.iter().map(stmt_height))
}

fn opt_height(expr: &Option<Expr>) -> u32 {
    expr.as_ref().map_or(0, expr_height)
}

fn decl_height(decl: &VarDecl) -> u32 {
    max_of(decl.declarators.iter().map(|d| opt_height(&d.init)))
}

fn stmt_height(stmt: &Stmt) -> u32 {
    let below = match &stmt.kind {
        StmtKind::Empty | StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Debugger => 0,
        StmtKind::Block(body) => body_height(body),
        StmtKind::Expr(expr) | StmtKind::Throw(expr) => expr_height(expr),
        StmtKind::Var(decl) => decl_height(decl),
        StmtKind::Function(func) => body_height(&func.body),
        StmtKind::Return(value) => opt_height(value),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => expr_height(test)
            .max(stmt_height(consequent))
            .max(alternate.as_deref().map_or(0, stmt_height)),
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            let init = match init {
                Some(ForInit::Var(decl)) => decl_height(decl),
                Some(ForInit::Expr(expr)) => expr_height(expr),
                None => 0,
            };
            init.max(opt_height(test))
                .max(opt_height(update))
                .max(stmt_height(body))
        }
        StmtKind::ForIn { left, right, body } => {
            let left = match left {
                ForInLeft::Var(..) => 0,
                ForInLeft::Expr(expr) => expr_height(expr),
            };
            left.max(expr_height(right)).max(stmt_height(body))
        }
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            expr_height(test).max(stmt_height(body))
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => body_height(block)
            .max(handler.as_ref().map_or(0, |h| body_height(&h.body)))
            .max(finalizer.as_deref().map_or(0, body_height)),
        StmtKind::Switch {
            discriminant,
            cases,
        } => expr_height(discriminant).max(max_of(
            cases
                .iter()
                .map(|c| opt_height(&c.test).max(body_height(&c.body))),
        )),
        StmtKind::Labeled { body, .. } => stmt_height(body),
    };
    below + 1
}

fn max_of(heights: impl Iterator<Item = u32>) -> u32 {
    heights.max().unwrap_or(0)
}
