//! Front end for rule expressions: a lexer, a Pratt parser and a validator that
//! infers the type of an expression against a catalog of known identifiers and
//! functions, without evaluating it.
//!
//! The three stages are independent pure functions ([`lex_expression`],
//! [`parse_tokens`], [`validate_ast`]); [`check`] runs them in sequence.

pub mod error;
pub mod runtime;
pub mod syntax;

use serde::Serialize;

pub use error::{Diagnostic, ErrorKind, PResult};
pub use runtime::{
    eval::{Validator, ValidatorConfig},
    preset::{device_keywords, Catalog, Keyword},
    value::{DataObj, DataType, FunctionSpec, Param},
};
pub use syntax::{
    ExprKind, Expression, Lexer, LexerConfig, Operator, Parser, ParserConfig, Token, TokenKind,
    DEFAULT_BOUNDARY_SYMBOL, DEFAULT_IDENT_PATTERN, DEFAULT_MAX_DEPTH,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexOutput<'src> {
    pub tokens: Vec<Token<'src>>,
    pub error: Option<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutput<'src> {
    /// Must be treated as partial when `error` is set.
    pub ast: Option<Expression<'src>>,
    pub error: Option<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub error: Option<Diagnostic>,
}

pub fn lex_expression<'src>(source: &'src str, config: &LexerConfig) -> LexOutput<'src> {
    let mut lexer = Lexer::new(source, config);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    let error = lexer.into_error();

    log::debug!("lexed {} tokens, error: {:?}", tokens.len(), error);
    LexOutput { tokens, error }
}

pub fn parse_tokens<'src>(tokens: &[Token<'src>], config: &ParserConfig) -> ParseOutput<'src> {
    let mut parser = Parser::new(tokens, config);

    match parser.parse() {
        Ok(ast) => ParseOutput {
            ast: Some(*ast),
            error: parser.take_deferred(),
        },
        Err(why) => {
            log::debug!("{why}");
            ParseOutput {
                ast: None,
                error: Some(why.diagnostic().clone()),
            }
        }
    }
}

pub fn validate_ast(ast: &Expression, config: &ValidatorConfig) -> Validation {
    let res = Validator::new(config).validate(ast);
    log::debug!("validated `{ast}` -> {}", res.data_type());

    match res {
        DataObj::Error { message, offset } => Validation {
            is_valid: false,
            error: Some(Diagnostic { message, offset }),
        },
        _ => Validation {
            is_valid: true,
            error: None,
        },
    }
}

/// Everything the pipeline produced. `error` is the first error any stage reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<'src> {
    pub tokens: Vec<Token<'src>>,
    pub ast: Option<Expression<'src>>,
    pub is_valid: bool,
    pub error: Option<ErrorKind>,
}

/// Lexes, parses and validates `source`.
///
/// Parsing still runs after a lexical error so callers can display the tree, but
/// validation only ever sees a tree from an error-free run.
pub fn check<'src>(
    source: &'src str,
    lex_config: &LexerConfig,
    parse_config: &ParserConfig,
    validator_config: &ValidatorConfig,
) -> Report<'src> {
    let lexed = lex_expression(source, lex_config);
    let mut error = lexed.error.map(ErrorKind::LexError);

    let parsed = parse_tokens(&lexed.tokens, parse_config);
    if error.is_none() {
        error = parsed.error.map(ErrorKind::ParseError);
    }

    let mut is_valid = false;
    if error.is_none() {
        if let Some(ast) = &parsed.ast {
            let validation = validate_ast(ast, validator_config);
            is_valid = validation.is_valid;
            error = validation.error.map(ErrorKind::ValidationError);
        }
    }

    Report {
        tokens: lexed.tokens,
        ast: parsed.ast,
        is_valid,
        error,
    }
}
