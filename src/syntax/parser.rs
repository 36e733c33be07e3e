use crate::{
    error::{Diagnostic, ErrorKind, PResult},
    syntax::{
        lexer::DEFAULT_BOUNDARY_SYMBOL,
        token::{Token, TokenKind},
        ExprParser, Expression,
    },
};

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Should match the lexer's symbol; delimited numerics skip the float check.
    pub ident_boundary_symbol: char,
    /// Deepest allowed nesting of groups, prefix operators and call arguments,
    /// and the tallest tree the parser builds.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ident_boundary_symbol: DEFAULT_BOUNDARY_SYMBOL,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Cursor over a token slice with one token of lookahead.
pub struct Parser<'a, 'src> {
    tokens: &'a [Token<'src>],
    pos: usize,
    pub(super) config: &'a ParserConfig,
    depth: usize,
    /// Token of the last grouped expression and how many groups in a row wrapped it.
    pub(super) last_group: Option<(Token<'src>, u32)>,
    /// Error recorded by a rule that still produced a node.
    pub(super) deferred: Option<Diagnostic>,
}

impl<'a, 'src> Parser<'a, 'src> {
    pub fn new(tokens: &'a [Token<'src>], config: &'a ParserConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            config,
            depth: 0,
            last_group: None,
            deferred: None,
        }
    }

    /// Parses the whole token sequence as one expression.
    ///
    /// On success the returned tree may still come with an error from
    /// [`Parser::take_deferred`], in which case it is partial.
    pub fn parse(&mut self) -> PResult<Box<Expression<'src>>> {
        if self.tokens.is_empty() {
            return Err(ErrorKind::ParseError(Diagnostic::unanchored(
                "No tokens to parse",
            )));
        }

        let expr = self.parse_expr()?;

        if self.deferred.is_none() && !self.peek_is(TokenKind::End) {
            return Err(self.syntax_error("Unexpected token", self.peek()));
        }

        log::debug!("parsed `{expr}`");
        Ok(expr)
    }

    pub fn take_deferred(&mut self) -> Option<Diagnostic> {
        self.deferred.take()
    }

    pub(super) fn cur(&self) -> Token<'src> {
        self.tokens[self.pos]
    }

    /// A missing END is treated as if it were there.
    pub(super) fn peek(&self) -> Token<'src> {
        match self.tokens.get(self.pos + 1) {
            Some(token) => *token,
            None => {
                let last = self.tokens[self.tokens.len() - 1];
                Token::new("", TokenKind::End, last.offset)
            }
        }
    }

    #[inline(always)]
    pub(super) fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(super) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    pub(super) fn expect_peek(&mut self, expected: TokenKind) -> PResult<()> {
        if self.peek_is(expected) {
            self.bump();
            return Ok(());
        }
        let found = self.peek();
        Err(ErrorKind::ParseError(Diagnostic::new(
            format!(
                "Expected next token to be {expected}, got {} instead : {}",
                found.kind, found.offset
            ),
            found.offset,
        )))
    }

    pub(super) fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.too_deep(self.cur()));
        }
        Ok(())
    }

    /// Rejects a freshly built node once the tree gets taller than `max_depth`.
    pub(super) fn check_height(&self, expr: &Expression<'src>) -> PResult<()> {
        if expr.height() > self.config.max_depth {
            return Err(self.too_deep(expr.token));
        }
        Ok(())
    }

    fn too_deep(&self, token: Token) -> ErrorKind {
        ErrorKind::ParseError(Diagnostic::new(
            format!(
                "Maximum nesting depth exceeded ({}) ; position: {}",
                self.config.max_depth,
                token.offset + 1
            ),
            token.offset,
        ))
    }

    pub(super) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Rejects a lookahead token that may not follow the current one.
    pub(super) fn check_syntax(&self) -> PResult<()> {
        use TokenKind::*;

        if let Some(err) = &self.deferred {
            return Err(ErrorKind::ParseError(err.clone()));
        }

        let next = self.peek().kind;
        let allowed = match self.cur().kind {
            Ident => next != Ident,
            Numeric | String => !matches!(next, Ident | Numeric | String | LParen),
            RParen => !matches!(next, Ident | Numeric | String),
            LParen => matches!(
                next,
                Ident | Numeric | String | RParen | Plus | Minus | LParen | Bang | True | False
            ),
            Assign | Asterisk | Slash | Gt | Lt | Gte | Lte | Eq | NotEq => {
                matches!(next, Ident | Numeric | String | LParen | Bang)
            }
            Minus | Bang => matches!(next, Ident | Numeric | LParen),
            Plus => matches!(next, Ident | Numeric | LParen | String | Bang),
            _ => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(self.syntax_error("Unexpected token", self.peek()))
        }
    }

    pub(super) fn syntax_error(&self, what: &str, token: Token) -> ErrorKind {
        ErrorKind::ParseError(Diagnostic::new(
            format!(
                "Invalid syntax, {what}, '{}' ; position: {}",
                token.literal,
                token.offset + 1
            ),
            token.offset,
        ))
    }

    pub(super) fn no_prefix_error(&self, token: Token) -> ErrorKind {
        ErrorKind::ParseError(Diagnostic::new(
            format!(
                "No prefix parse function for {} found : {}",
                token.kind,
                token.offset + 1
            ),
            token.offset,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::{Parser, ParserConfig};
    use crate::{
        error::ErrorKind,
        syntax::{lexer::Lexer, LexerConfig, Token},
    };

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::new(src, &LexerConfig::default()).collect()
    }

    fn parse_err(src: &str) -> String {
        let tokens = tokens(src);
        let config = ParserConfig::default();
        match Parser::new(&tokens, &config).parse() {
            Err(ErrorKind::ParseError(d)) => d.message,
            other => panic!("expected a parse error for {src:?}, got {other:?}"),
        }
    }

    #[test]
    fn literal_after_literal() {
        let msg = parse_err("1 2");
        assert!(msg.contains("Unexpected token, '2'"), "{msg}");
    }

    #[test]
    fn ident_after_ident() {
        assert!(parse_err("a b").contains("Unexpected token, 'b'"));
    }

    #[test]
    fn operator_needs_operand() {
        assert!(parse_err("1 * * 2").contains("Unexpected token, '*'"));
        assert!(parse_err("1 +").contains("Unexpected token, '+'"));
        assert!(parse_err("-'a'").contains("Unexpected token, ''a''"));
    }

    #[test]
    fn unclosed_group() {
        let msg = parse_err("(1 + 2");
        assert!(msg.starts_with("Expected next token to be ), got END"), "{msg}");
    }

    #[test]
    fn empty_group() {
        assert!(parse_err("()").contains("Group can not be empty"));
    }

    #[test]
    fn no_prefix_rule() {
        assert!(parse_err("* 2").starts_with("No prefix parse function for *"));
        assert!(parse_err("{").starts_with("No prefix parse function for {"));
    }

    #[test]
    fn trailing_tokens() {
        assert!(parse_err("a && b").contains("Unexpected token, '&&'"));
        assert!(parse_err("1 , 2").contains("Unexpected token, ','"));
        assert!(parse_err("(1))").contains("Unexpected token, ')'"));
    }

    #[test]
    fn empty_token_sequence() {
        let config = ParserConfig::default();
        let err = Parser::new(&[], &config).parse().unwrap_err();
        assert_eq!(err.diagnostic().offset, -1);
    }

    #[test]
    fn nesting_limit() {
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };
        let shallow = tokens("((((1))))");
        assert!(Parser::new(&shallow, &config).parse().is_ok());

        let deep = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        let deep = tokens(&deep);
        let err = Parser::new(&deep, &config).parse().unwrap_err();
        assert!(err
            .diagnostic()
            .message
            .starts_with("Maximum nesting depth exceeded"));
    }

    #[test]
    fn long_flat_chain() {
        let config = ParserConfig::default();

        let fits = vec!["1"; config.max_depth].join(" + ");
        let fits = tokens(&fits);
        let expr = Parser::new(&fits, &config).parse().unwrap();
        assert_eq!(expr.height(), config.max_depth);

        let long = vec!["1"; 300_000].join("+");
        let long = tokens(&long);
        let err = Parser::new(&long, &config).parse().unwrap_err();
        assert!(err
            .diagnostic()
            .message
            .starts_with("Maximum nesting depth exceeded (128)"));
    }

    #[test]
    fn tall_calls_and_chains() {
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };

        let calls = tokens("f(g(h(i(j(k(l(m(1))))))))");
        assert!(Parser::new(&calls, &config).parse().is_err());

        let chain = vec!["1"; 9].join(" - ");
        let chain = tokens(&chain);
        let err = Parser::new(&chain, &config).parse().unwrap_err();
        assert!(matches!(err, ErrorKind::ParseError(_)));
    }
}
