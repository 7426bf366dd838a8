//! Program, function and variable declaration parsing.

use jslink_lexer::token::TokenKind;
use jslink_types::ast::*;
use jslink_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Program
    // ══════════════════════════════════════════════════════════════════════════

    /// `Program = { Statement } EOF`
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let start = self.current_span();
        let body = self.parse_statement_list(|p| p.at_end());
        let span = start.merge(self.previous_span());
        Some(Program { body, span })
    }

    /// Parse statements until `done` holds, recovering from errors.
    pub(crate) fn parse_statement_list(&mut self, done: impl Fn(&Self) -> bool) -> Vec<Stmt> {
        let mut body = Vec::new();
        while !done(self) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let from = self.position();
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(from),
            }
        }
        body
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `function [name] ( params ) { body }`
    ///
    /// The name is required for declarations and optional for expressions.
    pub(crate) fn parse_function(&mut self, require_name: bool) -> Option<Function> {
        let start = self.current_span();
        self.expect(&TokenKind::Function)?;

        if self.check(&TokenKind::Star) {
            self.error_at_current(
                ErrorCode::UNSUPPORTED_SYNTAX,
                "generator functions are not supported",
            );
            return None;
        }

        let name = if matches!(self.peek_kind(), TokenKind::Identifier(_)) || require_name {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DotDotDot) {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "rest parameters are not supported",
                );
                return None;
            }
            params.push(self.expect_identifier()?);
            if self.check(&TokenKind::Eq) {
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_SYNTAX,
                    "default parameter values are not supported",
                );
                return None;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_function_body()?;
        let span = start.merge(self.previous_span());
        Some(Function {
            name,
            params,
            body,
            span,
            scope: None,
        })
    }

    fn parse_function_body(&mut self) -> Option<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        self.enter()?;
        let body = self.with_no_in(false, |p| {
            p.parse_statement_list(|p| p.check(&TokenKind::RBrace))
        });
        self.leave();
        self.expect(&TokenKind::RBrace)?;
        Some(body)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Variable Declarations
    // ══════════════════════════════════════════════════════════════════════════

    /// `var|let|const name [= init] {, name [= init]}` without the terminator.
    ///
    /// Respects the `no_in` flag so it can serve as a `for` initialiser.
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let kind = match self.advance().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            other => {
                let span = self.previous_span();
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected 'var', 'let' or 'const', got '{other}'"),
                    span,
                );
                return None;
            }
        };

        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(VarDeclarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(VarDecl { kind, declarators })
    }
}
