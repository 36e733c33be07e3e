mod expr;
mod expr_parser;
mod lexer;
mod parser;
mod token;

pub use expr::{ExprKind, Expression};
pub use lexer::{Lexer, LexerConfig, DEFAULT_BOUNDARY_SYMBOL, DEFAULT_IDENT_PATTERN};
pub use parser::{Parser, ParserConfig, DEFAULT_MAX_DEPTH};
pub use token::{Operator, Precedence, Token, TokenKind};

use crate::error::PResult;

/// Prefix and infix rules of the Pratt parser. Every rule starts with the token it
/// handles as the current token and leaves the last token it consumed current.
pub(crate) trait ExprParser<'src> {
    fn parse_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_expr_with_precedence(
        &mut self,
        min_prec: Precedence,
    ) -> PResult<Box<Expression<'src>>>;
    fn parse_prefix(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_numeric_literal(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_grouping_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_unary_expr(&mut self, op: Operator) -> PResult<Box<Expression<'src>>>;
    fn parse_infix_expr(&mut self, lhs: Box<Expression<'src>>)
        -> PResult<Box<Expression<'src>>>;
    fn parse_call_expr(&mut self, callee: Box<Expression<'src>>)
        -> PResult<Box<Expression<'src>>>;
    fn parse_call_args(&mut self) -> PResult<Vec<Expression<'src>>>;
}
