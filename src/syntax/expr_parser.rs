use crate::error::{Diagnostic, ErrorKind, PResult};

use super::{
    expr::ExprKind,
    token::{Precedence, TokenKind},
    ExprParser, Expression, Operator, Parser,
};

impl<'a, 'src> ExprParser<'src> for Parser<'a, 'src> {
    fn parse_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.parse_expr_with_precedence(Precedence::Lowest)
    }

    fn parse_expr_with_precedence(
        &mut self,
        min_prec: Precedence,
    ) -> PResult<Box<Expression<'src>>> {
        self.enter()?;
        self.check_syntax()?;

        let mut lhs = self.parse_prefix()?;
        self.check_height(&lhs)?;

        while self.deferred.is_none()
            && !self.peek_is(TokenKind::End)
            && min_prec < self.peek().kind.precedence()
        {
            let next = self.peek().kind;
            if !has_infix_rule(next) {
                break;
            }
            self.bump();

            if self.peek_is(TokenKind::End) {
                return Err(self.syntax_error("Unexpected token", self.cur()));
            }

            lhs = match next {
                TokenKind::LParen => self.parse_call_expr(lhs)?,
                _ => self.parse_infix_expr(lhs)?,
            };
            self.check_height(&lhs)?;
        }

        self.leave();
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> PResult<Box<Expression<'src>>> {
        let token = self.cur();
        let kind = match token.kind {
            TokenKind::Ident => ExprKind::Identifier {
                value: token.literal,
            },
            TokenKind::String => ExprKind::StringLiteral {
                value: unquote(token.literal),
            },
            TokenKind::True | TokenKind::False => ExprKind::Boolean {
                value: token.is(TokenKind::True),
            },
            TokenKind::Numeric => return self.parse_numeric_literal(),
            TokenKind::LParen => return self.parse_grouping_expr(),
            TokenKind::Bang => return self.parse_unary_expr(Operator::Bang),
            TokenKind::Minus => return self.parse_unary_expr(Operator::Minus),
            _ => return Err(self.no_prefix_error(token)),
        };
        Ok(Box::new(Expression::new(token, kind)))
    }

    fn parse_numeric_literal(&mut self) -> PResult<Box<Expression<'src>>> {
        let token = self.cur();
        let symbol = self.config.ident_boundary_symbol;
        let delimited = token.variable
            || (token.literal.starts_with(symbol) && token.literal.ends_with(symbol));

        let value = if delimited {
            None
        } else {
            match leading_float(token.literal) {
                Some(v) => Some(v),
                None => {
                    let err = Diagnostic::new(
                        format!("Could not parse {} as float64", token.literal),
                        token.offset,
                    );
                    // a bare `...` still yields a node, flagged as partial
                    if token.literal != "..." {
                        return Err(ErrorKind::ParseError(err));
                    }
                    self.deferred = Some(err);
                    None
                }
            }
        };

        Ok(Box::new(Expression::new(
            token,
            ExprKind::NumericLiteral { value },
        )))
    }

    fn parse_grouping_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.check_syntax()?;
        if self.peek_is(TokenKind::RParen) {
            return Err(self.syntax_error("Group can not be empty", self.cur()));
        }
        self.bump();

        let mut expr = self.parse_expr()?;

        let count = match self.last_group {
            Some((token, count)) if token == expr.token => count + 1,
            _ => 1,
        };
        self.last_group = Some((expr.token, count));

        self.expect_peek(TokenKind::RParen)?;
        expr.with_bracket = count;
        Ok(expr)
    }

    fn parse_unary_expr(&mut self, op: Operator) -> PResult<Box<Expression<'src>>> {
        let token = self.cur();
        self.bump();
        self.check_syntax()?;

        let right = self.parse_expr_with_precedence(Precedence::Prefix)?;
        Ok(Box::new(Expression::new(
            token,
            ExprKind::Prefix {
                operator: op,
                right,
            },
        )))
    }

    fn parse_infix_expr(
        &mut self,
        lhs: Box<Expression<'src>>,
    ) -> PResult<Box<Expression<'src>>> {
        self.check_syntax()?;
        let token = self.cur();
        let operator = match Operator::from_kind(token.kind) {
            Some(op) => op,
            None => return Err(self.syntax_error("Unexpected token", token)),
        };
        let prec = token.kind.precedence();
        self.bump();

        let rhs = self.parse_expr_with_precedence(prec)?;
        Ok(Box::new(Expression::new(
            token,
            ExprKind::Infix {
                operator,
                left: lhs,
                right: rhs,
            },
        )))
    }

    fn parse_call_expr(
        &mut self,
        callee: Box<Expression<'src>>,
    ) -> PResult<Box<Expression<'src>>> {
        self.check_syntax()?;
        let token = self.cur();

        let name = match callee.kind {
            ExprKind::Identifier { value } => value,
            _ => callee.token.literal,
        };
        let function = Box::new(Expression::new(
            callee.token,
            ExprKind::Function { value: name },
        ));
        let arguments = self.parse_call_args()?;

        Ok(Box::new(Expression::new(
            token,
            ExprKind::Call {
                function,
                arguments,
            },
        )))
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expression<'src>>> {
        let mut args = vec![];

        if self.peek_is(TokenKind::RParen) {
            self.bump();
            self.check_syntax()?;
            return Ok(args);
        }

        self.bump();
        args.push(*self.parse_expr()?);

        while self.peek_is(TokenKind::Comma) {
            self.bump();
            self.bump();
            args.push(*self.parse_expr()?);
        }

        self.expect_peek(TokenKind::RParen)?;
        self.check_syntax()?;
        Ok(args)
    }
}

fn has_infix_rule(kind: TokenKind) -> bool {
    kind == TokenKind::LParen || Operator::from_kind(kind).is_some_and(|op| op != Operator::Bang)
}

fn unquote(literal: &str) -> &str {
    let inner = literal.strip_prefix('\'').unwrap_or(literal);
    inner.strip_suffix('\'').unwrap_or(inner)
}

/// Longest leading decimal number, `None` when there is no digit to start one.
fn leading_float(s: &str) -> Option<f64> {
    let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut end = int_len;
    let mut frac_len = 0;

    if s[end..].starts_with('.') {
        frac_len = s[end + 1..].bytes().take_while(u8::is_ascii_digit).count();
        end += 1 + frac_len;
    }

    if int_len + frac_len == 0 {
        return None;
    }
    s[..end].parse().ok()
}
