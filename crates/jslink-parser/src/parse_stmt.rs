//! Statement parsing.

use jslink_lexer::token::TokenKind;
use jslink_types::ast::*;
use jslink_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.enter()?;
        let stmt = self.parse_statement_inner();
        self.leave();
        stmt
    }

    fn parse_statement_inner(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let kind = match self.peek_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon()?;
                StmtKind::Var(decl)
            }
            TokenKind::Function => StmtKind::Function(self.parse_function(true)?),
            TokenKind::If => self.parse_if()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::While => {
                self.advance();
                let test = self.parse_paren_expression()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { test, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect(&TokenKind::While)?;
                let test = self.parse_paren_expression()?;
                // a `;` is always optional after do-while
                self.eat(&TokenKind::Semicolon);
                StmtKind::DoWhile { body, test }
            }
            TokenKind::Return => {
                self.advance();
                let arg = if self.ends_restricted_production() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                StmtKind::Return(arg)
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.advance().kind == TokenKind::Break;
                let label = match self.peek_kind() {
                    TokenKind::Identifier(name) if !self.newline_before() => {
                        let name = name.clone();
                        self.advance();
                        Some(name)
                    }
                    _ => None,
                };
                self.consume_semicolon()?;
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            TokenKind::Throw => {
                self.advance();
                if self.newline_before() {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "line break is not allowed after 'throw'",
                    );
                    return None;
                }
                let arg = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Throw(arg)
            }
            TokenKind::Try => self.parse_try()?,
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon()?;
                StmtKind::Debugger
            }
            TokenKind::With => {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_WITH,
                    "'with' statements are not supported",
                );
                return None;
            }
            TokenKind::Class | TokenKind::Import | TokenKind::Export => {
                let message = format!("'{}' declarations are not supported", self.peek_kind());
                self.error_at_current(ErrorCode::UNSUPPORTED_SYNTAX, message);
                return None;
            }
            TokenKind::Identifier(label) if self.look_ahead(1) == &TokenKind::Colon => {
                let label = label.clone();
                self.advance();
                self.advance();
                let body = Box::new(self.parse_statement()?);
                StmtKind::Labeled { label, body }
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Expr(expr)
            }
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(kind, span))
    }

    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        let body = self.parse_statement_list(|p| p.check(&TokenKind::RBrace));
        self.expect(&TokenKind::RBrace)?;
        Some(body)
    }

    /// No operand follows `return` on the same logical line.
    fn ends_restricted_production(&self) -> bool {
        self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
            || self.newline_before()
    }

    /// `( Expression )`
    fn parse_paren_expression(&mut self) -> Option<Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.with_no_in(false, |p| p.parse_expression())?;
        self.expect(&TokenKind::RParen)?;
        Some(expr)
    }

    /// `if ( test ) stmt [else stmt]`
    fn parse_if(&mut self) -> Option<StmtKind> {
        self.advance();
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    /// `for (init; test; update) body` or `for (left in right) body`
    fn parse_for(&mut self) -> Option<StmtKind> {
        self.advance();
        self.expect(&TokenKind::LParen)?;

        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.with_no_in(true, |p| p.parse_var_decl())?;
                if self.check(&TokenKind::In) {
                    return self.parse_for_in_var(decl);
                }
                self.reject_for_of()?;
                Some(ForInit::Var(decl))
            }
            _ => {
                let expr = self.with_no_in(true, |p| p.parse_expression())?;
                if self.eat(&TokenKind::In) {
                    if !is_assignment_target(&expr) {
                        self.error_at(
                            ErrorCode::INVALID_ASSIGNMENT_TARGET,
                            "invalid left-hand side in for-in loop",
                            expr.span,
                        );
                        return None;
                    }
                    return self.finish_for_in(ForInLeft::Expr(expr));
                }
                self.reject_for_of()?;
                Some(ForInit::Expr(expr))
            }
        };

        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.with_no_in(false, |p| p.parse_expression())?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.with_no_in(false, |p| p.parse_expression())?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Some(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    fn parse_for_in_var(&mut self, decl: VarDecl) -> Option<StmtKind> {
        let span = self.current_span();
        self.advance();
        let mut declarators = decl.declarators;
        if declarators.len() != 1 || declarators[0].init.is_some() {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                "for-in loop declares exactly one variable without initialiser",
                span,
            );
            return None;
        }
        let name = declarators.remove(0).name;
        self.finish_for_in(ForInLeft::Var(decl.kind, name))
    }

    fn finish_for_in(&mut self, left: ForInLeft) -> Option<StmtKind> {
        let right = self.with_no_in(false, |p| p.parse_expression())?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Some(StmtKind::ForIn { left, right, body })
    }

    fn reject_for_of(&mut self) -> Option<()> {
        if matches!(self.peek_kind(), TokenKind::Identifier(word) if word == "of") {
            self.error_at_current(
                ErrorCode::UNSUPPORTED_SYNTAX,
                "for-of loops are not supported",
            );
            return None;
        }
        Some(())
    }

    /// `try { } [catch (param) { }] [finally { }]`
    fn parse_try(&mut self) -> Option<StmtKind> {
        self.advance();
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            if !self.check(&TokenKind::LParen) {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "catch clauses without a binding are not supported",
                );
                return None;
            }
            self.advance();
            let param = self.expect_identifier()?;
            self.expect(&TokenKind::RParen)?;
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                scope: None,
            })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected 'catch' or 'finally', got '{}'", self.peek_kind()),
            );
            return None;
        }

        Some(StmtKind::Try {
            block,
            handler,
            finalizer,
        })
    }

    /// `switch (discriminant) { case test: ... default: ... }`
    fn parse_switch(&mut self) -> Option<StmtKind> {
        self.advance();
        let discriminant = self.parse_paren_expression()?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let test = match self.peek_kind() {
                TokenKind::Case => {
                    self.advance();
                    Some(self.with_no_in(false, |p| p.parse_expression())?)
                }
                TokenKind::Default => {
                    if seen_default {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "more than one 'default' clause in switch",
                        );
                        return None;
                    }
                    seen_default = true;
                    self.advance();
                    None
                }
                other => {
                    let message = format!("expected 'case' or 'default', got '{other}'");
                    self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                    return None;
                }
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_statement_list(|p| {
                matches!(
                    p.peek_kind(),
                    TokenKind::Case | TokenKind::Default | TokenKind::RBrace
                )
            });
            cases.push(SwitchCase { test, body });
        }
        self.expect(&TokenKind::RBrace)?;

        Some(StmtKind::Switch {
            discriminant,
            cases,
        })
    }
}

/// Identifiers and property accesses may be assigned to.
pub(crate) fn is_assignment_target(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
    )
}
