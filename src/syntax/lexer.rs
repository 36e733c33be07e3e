use std::fmt::Display;

use regex::Regex;

use super::token::{Token, TokenKind};
use crate::error::Diagnostic;

pub const DEFAULT_IDENT_PATTERN: &str = r"^[0-9A-Za-z_.\-]+$";
pub const DEFAULT_BOUNDARY_SYMBOL: char = '$';

const CJK_RANGE: std::ops::RangeInclusive<char> = '\u{4e00}'..='\u{9fd5}';

/// Lexer options. Defaults: ASCII identifiers only, no empty strings, `$` as the
/// variable delimiter and [`DEFAULT_IDENT_PATTERN`] for variable interiors.
#[derive(Debug, Clone)]
pub struct LexerConfig {
    pub allow_chinese_as_ident: bool,
    pub allow_empty_string: bool,
    pub ident_boundary_symbol: char,
    pub ident_pattern: Regex,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            allow_chinese_as_ident: false,
            allow_empty_string: false,
            ident_boundary_symbol: DEFAULT_BOUNDARY_SYMBOL,
            ident_pattern: Regex::new(DEFAULT_IDENT_PATTERN)
                .expect("Failed to compile the default ident pattern. (This should never happen)"),
        }
    }
}

impl LexerConfig {
    /// Replaces the pattern that delimited variables and quoted variables must match.
    pub fn with_ident_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.ident_pattern = Regex::new(pattern)?;
        Ok(self)
    }

    fn illegal_variable_hint(&self) -> &'static str {
        if self.ident_pattern.as_str() == DEFAULT_IDENT_PATTERN {
            r#"Variable should only include number, letter, "_", "-", ".""#
        } else {
            "Characters outside the allowed range appear"
        }
    }
}

/// Single pass scanner with one character of lookahead.
///
/// Offsets count characters. `position` is the index of `ch`, `next_position`
/// the index of the character after it.
pub struct Lexer<'src> {
    src: &'src str,
    chars: Vec<(usize, char)>,
    config: LexerConfig,
    ch: Option<char>,
    position: usize,
    next_position: usize,
    err: Option<Diagnostic>,
    finished: bool,
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::End) {
            self.finished = true;
        }
        Some(token)
    }
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str, config: &LexerConfig) -> Self {
        let mut lexer = Self {
            src,
            chars: src.char_indices().collect(),
            config: config.clone(),
            ch: None,
            position: 0,
            next_position: 0,
            err: None,
            finished: false,
        };

        if src.trim().is_empty() && !config.allow_empty_string {
            lexer.raise("Expression should not be empty", "", 0);
            lexer.finished = true;
        }

        lexer.read_char();
        lexer
    }

    /// The first error met so far.
    pub fn error(&self) -> Option<&Diagnostic> {
        self.err.as_ref()
    }

    pub fn into_error(self) -> Option<Diagnostic> {
        self.err
    }

    fn next_token(&mut self) -> Token<'src> {
        self.skip_whitespace();

        let c = match self.ch {
            None => return Token::new("", TokenKind::End, self.chars.len()),
            Some(c) => c,
        };

        let token = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Asterisk),
            '/' => self.single(TokenKind::Slash),
            '\'' => self.read_string(),
            '=' => self.double('=', TokenKind::Eq, TokenKind::Assign),
            '!' => self.double('=', TokenKind::NotEq, TokenKind::Bang),
            '<' => self.double('=', TokenKind::Lte, TokenKind::Lt),
            '>' => self.double('=', TokenKind::Gte, TokenKind::Gt),
            '&' => self.double('&', TokenKind::And, TokenKind::BitAnd),
            '|' => self.double('|', TokenKind::Or, TokenKind::BitOr),
            // these leave `ch` on the character after the lexeme
            c if self.is_letter(c) => return self.read_identifier(),
            c if is_number(c) => return self.read_number(),
            c if c == self.config.ident_boundary_symbol => return self.read_variable(),
            c => {
                let token = Token::new(
                    self.slice(self.position, self.position + 1),
                    TokenKind::Invalid,
                    self.position,
                );
                self.raise("Invalid token", c, self.position);
                self.finished = true;
                token
            }
        };

        self.read_char();
        token
    }

    fn read_char(&mut self) {
        self.ch = self.chars.get(self.next_position).map(|&(_, c)| c);
        self.position = self.next_position;
        self.next_position += 1;
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.next_position).map(|&(_, c)| c)
    }

    fn byte_at(&self, position: usize) -> usize {
        self.chars
            .get(position)
            .map_or(self.src.len(), |&(off, _)| off)
    }

    fn slice(&self, from: usize, to: usize) -> &'src str {
        let src = self.src;
        &src[self.byte_at(from)..self.byte_at(to)]
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(c) if c.is_whitespace()) {
            self.read_char();
        }
    }

    fn single(&self, kind: TokenKind) -> Token<'src> {
        Token::new(
            self.slice(self.position, self.position + 1),
            kind,
            self.next_position,
        )
    }

    fn double(&mut self, next: char, double: TokenKind, single: TokenKind) -> Token<'src> {
        if self.peek_char() == Some(next) {
            let start = self.position;
            self.read_char();
            Token::new(self.slice(start, self.position + 1), double, self.position)
        } else {
            Token::new(
                self.slice(self.position, self.position + 1),
                single,
                self.position,
            )
        }
    }

    fn read_string(&mut self) -> Token<'src> {
        let quote = self.position;
        let start = quote + 1;
        let mut terminated = true;

        loop {
            self.read_char();
            match self.ch {
                Some('\'') => break,
                None => {
                    terminated = false;
                    self.raise("Unterminated string constant", '\'', self.position);
                    break;
                }
                Some(c) if c.is_whitespace() || c.is_control() => self.raise(
                    "Illegal stringliteral",
                    "Stringliteral can not include blank, enter, tab and other format character",
                    self.position,
                ),
                Some(_) => (),
            }
        }

        if !self.config.allow_empty_string && self.position == start {
            self.raise(
                "Illegal stringliteral",
                "Stringliteral can not be empty",
                self.position,
            );
        }

        let content = self.slice(start, self.position);
        let symbol = self.config.ident_boundary_symbol;
        if content.starts_with(symbol)
            && content.ends_with(symbol)
            && !self.config.ident_pattern.is_match(interior(content, symbol))
        {
            self.raise(
                "Illegal variable,",
                self.config.illegal_variable_hint(),
                self.position + 1,
            );
        }

        if terminated {
            Token::new(
                self.slice(quote, self.position + 1),
                TokenKind::String,
                self.next_position,
            )
        } else {
            Token::new(
                self.slice(quote, self.position),
                TokenKind::String,
                self.chars.len(),
            )
        }
    }

    fn read_identifier(&mut self) -> Token<'src> {
        let start = self.position;
        loop {
            self.read_char();
            match self.ch {
                Some(c) if self.is_word_char(c) => (),
                _ => break,
            }
        }

        let literal = self.slice(start, self.position);
        let kind = TokenKind::keyword(literal).unwrap_or(TokenKind::Ident);
        Token::new(literal, kind, self.position)
    }

    fn read_number(&mut self) -> Token<'src> {
        let start = self.position;
        while matches!(self.ch, Some(c) if is_number(c)) {
            self.read_char();
        }

        if let Some(c) = self.ch {
            if is_identifier_start(c) {
                self.raise("Identifier directly after number", c, self.position);
            }
        }

        Token::new(
            self.slice(start, self.position),
            TokenKind::Numeric,
            self.position,
        )
    }

    /// Boundary delimited variables are tagged NUMERIC so the parser treats them as
    /// numeric literals.
    fn read_variable(&mut self) -> Token<'src> {
        let start = self.position;
        let symbol = self.config.ident_boundary_symbol;

        loop {
            self.read_char();
            match self.ch {
                Some(c) if c == symbol => break,
                None => {
                    self.raise(&format!("Lack of {symbol}"), "", self.position);
                    break;
                }
                Some(_) => (),
            }
        }

        let literal = self.slice(start, self.position + 1);
        if !self.config.ident_pattern.is_match(interior(literal, symbol)) {
            self.raise(
                "Illegal variable,",
                self.config.illegal_variable_hint(),
                self.position,
            );
        }

        self.read_char();
        let mut token = Token::new(
            literal,
            TokenKind::Numeric,
            self.position.min(self.chars.len()),
        );
        token.variable = true;
        token
    }

    fn is_letter(&self, c: char) -> bool {
        c == '_'
            || c.is_ascii_alphabetic()
            || (self.config.allow_chinese_as_ident && CJK_RANGE.contains(&c))
    }

    fn is_word_char(&self, c: char) -> bool {
        self.is_letter(c) || c.is_ascii_digit()
    }

    fn raise(&mut self, what: &str, detail: impl Display, offset: usize) {
        if self.err.is_some() {
            return;
        }
        let detail = detail.to_string();
        let message = if detail.is_empty() {
            format!("{what}, please check position({offset})")
        } else {
            format!("{what} {detail}, please check position({offset})")
        };
        log::trace!("lex error at {offset}: {message}");
        self.err = Some(Diagnostic::new(message, offset));
    }
}

fn is_number(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn interior(s: &str, symbol: char) -> &str {
    let inner = s.strip_prefix(symbol).unwrap_or(s);
    inner.strip_suffix(symbol).unwrap_or(inner)
}
