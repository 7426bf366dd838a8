//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 1. `,` (sequence)
//! 2. `=`, `+=`, ... (assignment, right-associative)
//! 3. `? :` (conditional)
//! 4. binary operators, from `||` up to `* / %` (see `binary_precedence`)
//! 5. unary `! - + ~ typeof void delete`, prefix `++ --`
//! 6. postfix `++ --`
//! 7. call, member access, `new`

use jslink_lexer::token::TokenKind;
use jslink_types::ast::*;
use jslink_types::ErrorCode;

use crate::height::expr_height;
use crate::parse_stmt::is_assignment_target;
use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Points
    // ══════════════════════════════════════════════════════════════════════════

    /// `Expression = Assignment { "," Assignment }`
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Some(first);
        }
        let mut span = first.span;
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            let next = self.parse_assignment()?;
            span = span.merge(next.span);
            exprs.push(next);
        }
        Some(Expr::new(ExprKind::Sequence(exprs), span))
    }

    /// `Assignment = Conditional [ AssignOp Assignment ]`
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Expr> {
        let target = self.parse_conditional()?;

        if self.check(&TokenKind::Arrow) {
            self.error_at_current(
                ErrorCode::UNSUPPORTED_SYNTAX,
                "arrow functions are not supported",
            );
            return None;
        }

        let Some(op) = assign_op(self.peek_kind()) else {
            return Some(target);
        };
        if !is_assignment_target(&target) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "invalid left-hand side in assignment",
                target.span,
            );
            return None;
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Conditional = Binary [ "?" Assignment ":" Assignment ]`
    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_binary(0)?;
        if !self.eat(&TokenKind::Question) {
            return Some(test);
        }
        let consequent = self.with_no_in(false, |p| p.parse_assignment())?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(alternate.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    /// Left-associative binary operators binding tighter than `min_prec`.
    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        let mut height = None;
        loop {
            let Some(op) = binary_op(self.peek_kind()) else {
                break;
            };
            if op == BinaryOp::In && self.no_in {
                break;
            }
            let prec = binary_precedence(op);
            if prec <= min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec)?;
            let spine = *height.get_or_insert_with(|| expr_height(&left));
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
            height = Some(self.chain_link(&left, spine)?);
        }
        Some(left)
    }

    /// Prefix operators.
    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let unary = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = unary {
            self.advance();
            self.enter()?;
            let arg = self.parse_unary();
            self.leave();
            let arg = arg?;
            let span = start.merge(arg.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                },
                span,
            ));
        }

        let update = match self.peek_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            self.enter()?;
            let arg = self.parse_unary();
            self.leave();
            let arg = self.update_target(arg?)?;
            let span = start.merge(arg.span);
            return Some(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    arg: Box::new(arg),
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    /// `LeftHandSide [ "++" | "--" ]`, with no line break before the operator.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_call_or_member()?;
        if self.newline_before() {
            return Some(expr);
        }
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Some(expr),
        };
        let expr = self.update_target(expr)?;
        let span = expr.span.merge(self.current_span());
        self.advance();
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                arg: Box::new(expr),
            },
            span,
        ))
    }

    fn update_target(&mut self, expr: Expr) -> Option<Expr> {
        if is_assignment_target(&expr) {
            Some(expr)
        } else {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "invalid operand for increment or decrement",
                expr.span,
            );
            None
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Calls, Members & `new`
    // ══════════════════════════════════════════════════════════════════════════

    /// `MemberOrNew { Arguments | "." Name | "[" Expression "]" }`
    fn parse_call_or_member(&mut self) -> Option<Expr> {
        let mut expr = self.parse_member_or_new()?;
        let mut height = None;
        loop {
            if !self.check(&TokenKind::LParen) && !self.at_member_suffix() {
                return Some(expr);
            }
            let spine = *height.get_or_insert_with(|| expr_height(&expr));
            if self.check(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                let span = expr.span.merge(self.previous_span());
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else {
                expr = self.parse_member_suffix(expr)?;
            }
            height = Some(self.chain_link(&expr, spine)?);
        }
    }

    /// `new MemberOrNew [ Arguments ]` or a primary expression, followed by
    /// any member accesses. Calls are left to the caller so that
    /// `new a.b(c)` binds the arguments to `new`.
    fn parse_member_or_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut expr = if self.eat(&TokenKind::New) {
            if self.check(&TokenKind::Dot) {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "'new.target' is not supported",
                );
                return None;
            }
            self.enter()?;
            let callee = self.parse_member_or_new();
            self.leave();
            let callee = callee?;
            let args = if self.check(&TokenKind::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            let span = start.merge(self.previous_span());
            Expr::new(
                ExprKind::New {
                    callee: Box::new(callee),
                    args,
                },
                span,
            )
        } else {
            self.parse_primary()?
        };

        let mut height = None;
        while self.at_member_suffix() {
            let spine = *height.get_or_insert_with(|| expr_height(&expr));
            expr = self.parse_member_suffix(expr)?;
            height = Some(self.chain_link(&expr, spine)?);
        }
        Some(expr)
    }

    fn at_member_suffix(&self) -> bool {
        self.check(&TokenKind::Dot) || self.check(&TokenKind::LBracket)
    }

    /// One `.name` or `[index]` suffix applied to `object`.
    fn parse_member_suffix(&mut self, object: Expr) -> Option<Expr> {
        if self.eat(&TokenKind::Dot) {
            let property = self.expect_property_name()?;
            let span = object.span.merge(self.previous_span());
            return Some(Expr::new(
                ExprKind::Member {
                    object: Box::new(object),
                    property,
                },
                span,
            ));
        }
        self.expect(&TokenKind::LBracket)?;
        let index = self.with_no_in(false, |p| p.parse_expression())?;
        self.expect(&TokenKind::RBracket)?;
        let span = object.span.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            span,
        ))
    }

    /// `( [ Assignment { "," Assignment } ] )`
    fn parse_arguments(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let args = self.with_no_in(false, |p| {
            let mut args = Vec::new();
            while !p.check(&TokenKind::RParen) {
                if p.check(&TokenKind::DotDotDot) {
                    p.error_at_current(
                        ErrorCode::UNSUPPORTED_SYNTAX,
                        "spread arguments are not supported",
                    );
                    return None;
                }
                args.push(p.parse_assignment()?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(args)
        })?;
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                ExprKind::Ident(Ident::new(name, start))
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::True | TokenKind::False => {
                let value = self.advance().kind == TokenKind::True;
                ExprKind::Bool(value)
            }
            TokenKind::Number(raw) => {
                self.advance();
                ExprKind::Number(raw)
            }
            TokenKind::String(value) => {
                self.advance();
                ExprKind::String(value)
            }
            TokenKind::Function => {
                let func = self.with_no_in(false, |p| p.parse_function(false))?;
                ExprKind::Function(Box::new(func))
            }
            TokenKind::LParen => {
                self.advance();
                if self.check(&TokenKind::RParen) {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "expected expression, got ')'",
                    );
                    return None;
                }
                let inner = self.with_no_in(false, |p| p.parse_expression())?;
                self.expect(&TokenKind::RParen)?;
                // Parentheses only group; the printer re-derives them.
                return Some(Expr::new(inner.kind, start.merge(self.previous_span())));
            }
            TokenKind::LBracket => self.parse_array()?,
            TokenKind::LBrace => self.parse_object()?,
            TokenKind::Class | TokenKind::Super | TokenKind::Import | TokenKind::DotDotDot => {
                let message = format!("'{}' is not supported", self.peek_kind());
                self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, message);
                return None;
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                return None;
            }
        };
        Some(Expr::new(kind, start.merge(self.previous_span())))
    }

    /// `[ a, , b ]`
    fn parse_array(&mut self) -> Option<ExprKind> {
        self.expect(&TokenKind::LBracket)?;
        let elements = self.with_no_in(false, |p| {
            let mut elements = Vec::new();
            while !p.check(&TokenKind::RBracket) {
                if p.eat(&TokenKind::Comma) {
                    elements.push(None);
                    continue;
                }
                if p.check(&TokenKind::DotDotDot) {
                    p.error_at_current(
                        ErrorCode::UNSUPPORTED_SYNTAX,
                        "spread elements are not supported",
                    );
                    return None;
                }
                elements.push(Some(p.parse_assignment()?));
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(elements)
        })?;
        self.expect(&TokenKind::RBracket)?;
        Some(ExprKind::Array(elements))
    }

    /// `{ key: value, ... }`
    fn parse_object(&mut self) -> Option<ExprKind> {
        self.expect(&TokenKind::LBrace)?;
        let props = self.with_no_in(false, |p| {
            let mut props = Vec::new();
            while !p.check(&TokenKind::RBrace) {
                props.push(p.parse_property()?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(props)
        })?;
        self.expect(&TokenKind::RBrace)?;
        Some(ExprKind::Object(props))
    }

    fn parse_property(&mut self) -> Option<Property> {
        let key = match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                if (name == "get" || name == "set")
                    && !matches!(
                        self.look_ahead(1),
                        TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen
                    )
                {
                    self.error_at_current(
                        ErrorCode::UNSUPPORTED_ACCESSOR,
                        format!("'{name}' accessors are not supported"),
                    );
                    return None;
                }
                PropKey::Ident(name)
            }
            TokenKind::String(value) => PropKey::String(value),
            TokenKind::Number(raw) => PropKey::Number(raw),
            TokenKind::LBracket => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "computed property names are not supported",
                );
                return None;
            }
            ref k if k.is_keyword() => PropKey::Ident(k.to_string()),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected property name, got '{other}'"),
                );
                return None;
            }
        };
        self.advance();

        if !self.check(&TokenKind::Colon) {
            let message = match self.peek_kind() {
                TokenKind::LParen => "method shorthand is not supported",
                _ => "shorthand properties are not supported",
            };
            self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, message);
            return None;
        }
        self.advance();
        let value = self.parse_assignment()?;
        Some(Property { key, value })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Operator tables
// ══════════════════════════════════════════════════════════════════════════════

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::UShrEq => AssignOp::UShr,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        _ => return None,
    };
    Some(op)
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::BangEqEq => BinaryOp::StrictNotEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::LessEq => BinaryOp::LessEq,
        TokenKind::GreaterEq => BinaryOp::GreaterEq,
        TokenKind::In => BinaryOp::In,
        TokenKind::Instanceof => BinaryOp::Instanceof,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::UShr => BinaryOp::UShr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    };
    Some(op)
}

/// Binding power of a binary operator; higher binds tighter.
fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::BitOr => 3,
        BinaryOp::BitXor => 4,
        BinaryOp::BitAnd => 5,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 6,
        BinaryOp::Less
        | BinaryOp::Greater
        | BinaryOp::LessEq
        | BinaryOp::GreaterEq
        | BinaryOp::In
        | BinaryOp::Instanceof => 7,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
        BinaryOp::Add | BinaryOp::Sub => 9,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
    }
}
