//! Expression printing.
//!
//! Every expression has a precedence level ([`Prec`]); an operand printed
//! in a slot that needs a higher level is wrapped in parentheses.

use jslink_types::ast::*;

use crate::parens::{is_plain_integer, new_callee_needs_parens};
use crate::printer::Printer;
use crate::stmt::emit_function;

/// Precedence levels, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prec {
    Sequence,
    Assign,
    Conditional,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Call,
    Member,
    Primary,
}

impl Prec {
    /// The next tighter level.
    fn next(self) -> Prec {
        match self {
            Prec::Sequence => Prec::Assign,
            Prec::Assign => Prec::Conditional,
            Prec::Conditional => Prec::Or,
            Prec::Or => Prec::And,
            Prec::And => Prec::BitOr,
            Prec::BitOr => Prec::BitXor,
            Prec::BitXor => Prec::BitAnd,
            Prec::BitAnd => Prec::Equality,
            Prec::Equality => Prec::Relational,
            Prec::Relational => Prec::Shift,
            Prec::Shift => Prec::Additive,
            Prec::Additive => Prec::Multiplicative,
            Prec::Multiplicative => Prec::Unary,
            Prec::Unary => Prec::Postfix,
            Prec::Postfix => Prec::Call,
            Prec::Call => Prec::Member,
            Prec::Member | Prec::Primary => Prec::Primary,
        }
    }
}

pub fn binary_prec(op: BinaryOp) -> Prec {
    match op {
        BinaryOp::Or => Prec::Or,
        BinaryOp::And => Prec::And,
        BinaryOp::BitOr => Prec::BitOr,
        BinaryOp::BitXor => Prec::BitXor,
        BinaryOp::BitAnd => Prec::BitAnd,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => {
            Prec::Equality
        }
        BinaryOp::Less
        | BinaryOp::Greater
        | BinaryOp::LessEq
        | BinaryOp::GreaterEq
        | BinaryOp::In
        | BinaryOp::Instanceof => Prec::Relational,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => Prec::Shift,
        BinaryOp::Add | BinaryOp::Sub => Prec::Additive,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Prec::Multiplicative,
    }
}

/// Precedence level of an expression as printed.
pub fn expr_prec(expr: &Expr) -> Prec {
    match &expr.kind {
        ExprKind::Sequence(_) => Prec::Sequence,
        ExprKind::Assign { .. } => Prec::Assign,
        ExprKind::Conditional { .. } => Prec::Conditional,
        ExprKind::Binary { op, .. } => binary_prec(*op),
        ExprKind::Unary { .. } => Prec::Unary,
        ExprKind::Update { prefix: true, .. } => Prec::Unary,
        ExprKind::Update { prefix: false, .. } => Prec::Postfix,
        ExprKind::Call { .. } => Prec::Call,
        // printed with an argument list, so it is a member expression
        ExprKind::New { .. } | ExprKind::Member { .. } | ExprKind::Index { .. } => Prec::Member,
        ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Null
        | ExprKind::Bool(_)
        | ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Array(_)
        | ExprKind::Object(_)
        | ExprKind::Function(_) => Prec::Primary,
    }
}

/// Print `expr` in a slot that requires at least `min` precedence.
pub fn emit_expr(expr: &Expr, min: Prec, p: &mut Printer) {
    if expr_prec(expr) < min {
        p.punct("(");
        emit_expr_inner(expr, p);
        p.punct(")");
    } else {
        emit_expr_inner(expr, p);
    }
}

fn emit_expr_inner(expr: &Expr, p: &mut Printer) {
    match &expr.kind {
        // ── Literals ──────────────────────────────────────────────────────
        ExprKind::Ident(ident) => p.word(&ident.name),
        ExprKind::This => p.word("this"),
        ExprKind::Null => p.word("null"),
        ExprKind::Bool(value) => p.word(if *value { "true" } else { "false" }),
        ExprKind::Number(raw) => p.word(raw),
        ExprKind::String(value) => p.word(&quote_string(value)),
        ExprKind::Array(elements) => emit_array(elements, p),
        ExprKind::Object(props) => emit_object(props, p),
        ExprKind::Function(func) => emit_function(func, p),

        // ── Operators ────────────────────────────────────────────────────
        ExprKind::Unary { op, arg } => {
            p.operator(op.as_str());
            emit_expr(arg, Prec::Unary, p);
        }
        ExprKind::Update { op, prefix, arg } => {
            if *prefix {
                p.punct(op.as_str());
                emit_expr(arg, Prec::Postfix, p);
            } else {
                emit_expr(arg, Prec::Call, p);
                p.punct(op.as_str());
            }
        }
        ExprKind::Binary { op, left, right } => {
            let prec = binary_prec(*op);
            emit_expr(left, prec, p);
            p.binary_operator(op.as_str());
            emit_expr(right, prec.next(), p);
        }
        ExprKind::Assign { op, target, value } => {
            emit_expr(target, Prec::Call, p);
            p.binary_operator(op.as_str());
            emit_expr(value, Prec::Assign, p);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            emit_expr(test, Prec::Or, p);
            p.binary_operator("?");
            emit_expr(consequent, Prec::Assign, p);
            p.binary_operator(":");
            emit_expr(alternate, Prec::Assign, p);
        }
        ExprKind::Sequence(exprs) => {
            for (i, e) in exprs.iter().enumerate() {
                if i > 0 {
                    p.comma();
                }
                emit_expr(e, Prec::Assign, p);
            }
        }

        // ── Calls & members ──────────────────────────────────────────────
        ExprKind::Call { callee, args } => {
            emit_expr(callee, Prec::Call, p);
            emit_arguments(args, p);
        }
        ExprKind::New { callee, args } => {
            p.word("new");
            if new_callee_needs_parens(callee) {
                p.punct("(");
                emit_expr(callee, Prec::Sequence, p);
                p.punct(")");
            } else {
                emit_expr(callee, Prec::Member, p);
            }
            emit_arguments(args, p);
        }
        ExprKind::Member { object, property } => {
            emit_member_object(object, p);
            p.punct(".");
            p.word(property);
        }
        ExprKind::Index { object, index } => {
            emit_member_object(object, p);
            p.punct("[");
            emit_expr(index, Prec::Sequence, p);
            p.punct("]");
        }
    }
}

/// `1.x` would lex as a number, so integer literals get parentheses.
fn emit_member_object(object: &Expr, p: &mut Printer) {
    match &object.kind {
        ExprKind::Number(raw) if is_plain_integer(raw) => {
            p.punct("(");
            p.word(raw);
            p.punct(")");
        }
        _ => emit_expr(object, Prec::Call, p),
    }
}

fn emit_arguments(args: &[Expr], p: &mut Printer) {
    p.punct("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            p.comma();
        }
        emit_expr(arg, Prec::Assign, p);
    }
    p.punct(")");
}

fn emit_array(elements: &[Option<Expr>], p: &mut Printer) {
    p.punct("[");
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            p.comma();
        }
        if let Some(e) = element {
            emit_expr(e, Prec::Assign, p);
        }
    }
    // a trailing hole needs its own comma to survive
    if matches!(elements.last(), Some(None)) {
        p.punct(",");
    }
    p.punct("]");
}

fn emit_object(props: &[Property], p: &mut Printer) {
    p.punct("{");
    for (i, prop) in props.iter().enumerate() {
        if i > 0 {
            p.comma();
        }
        match &prop.key {
            PropKey::Ident(name) => p.word(name),
            PropKey::String(value) => p.word(&quote_string(value)),
            PropKey::Number(raw) => p.word(raw),
        }
        p.punct(":");
        p.space();
        emit_expr(&prop.value, Prec::Assign, p);
    }
    p.punct("}");
}

// ══════════════════════════════════════════════════════════════════════════════
// String literals
// ══════════════════════════════════════════════════════════════════════════════

/// Quote a string value, choosing the quote character that needs fewer
/// escapes (double quotes on a tie).
pub fn quote_string(value: &str) -> String {
    let doubles = value.matches('"').count();
    let singles = value.matches('\'').count();
    let quote = if singles < doubles { '\'' } else { '"' };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{C}' => out.push_str("\\f"),
            '\u{B}' => out.push_str("\\v"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            // keep `</script` out of inline script blocks
            '/' if out.ends_with('<') => out.push_str("\\/"),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_prefers_double() {
        assert_eq!(quote_string("abc"), "\"abc\"");
        assert_eq!(quote_string("it's"), "\"it's\"");
        assert_eq!(quote_string("say \"hi\""), "'say \"hi\"'");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote_string("a\nb\\c"), "\"a\\nb\\\\c\"");
        assert_eq!(quote_string("\0"), "\"\\x00\"");
        assert_eq!(quote_string("</script>"), "\"<\\/script>\"");
        assert_eq!(quote_string("\u{2028}"), "\"\\u2028\"");
    }

    #[test]
    fn test_prec_order() {
        assert!(Prec::Sequence < Prec::Assign);
        assert!(Prec::Additive < Prec::Multiplicative);
        assert_eq!(Prec::Or.next(), Prec::And);
        assert_eq!(Prec::Primary.next(), Prec::Primary);
    }
}
