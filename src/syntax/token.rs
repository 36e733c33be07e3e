use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    #[serde(rename = "END")]
    End,
    #[serde(rename = "INVALID")]
    Invalid,
    #[serde(rename = "IDENT")]
    Ident,
    #[serde(rename = "NUMERIC")]
    Numeric,
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,

    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "!")]
    Bang,
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "/")]
    Slash,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = "(")]
    LParen,
    #[serde(rename = ")")]
    RParen,
    #[serde(rename = "{")]
    LBrace,
    #[serde(rename = "}")]
    RBrace,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::End => "END",
            Self::Invalid => "INVALID",
            Self::Ident => "IDENT",
            Self::Numeric => "NUMERIC",
            Self::String => "STRING",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Or => "||",
            Self::Comma => ",",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
        }
    }

    /// Binding power when the kind appears in infix position.
    pub fn precedence(self) -> Precedence {
        match self {
            Self::Assign => Precedence::Assign,
            Self::Eq | Self::NotEq => Precedence::Equals,
            Self::Lt | Self::Lte | Self::Gt | Self::Gte => Precedence::LessGreater,
            Self::Plus | Self::Minus => Precedence::Sum,
            Self::Asterisk | Self::Slash => Precedence::Product,
            Self::LParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }

    pub fn keyword(ident: &str) -> Option<Self> {
        match ident {
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'src> {
    pub literal: &'src str,
    pub kind: TokenKind,
    pub offset: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub variable: bool,
}

impl<'src> Token<'src> {
    pub fn new(literal: &'src str, kind: TokenKind, offset: usize) -> Self {
        Self {
            literal,
            kind,
            offset,
            variable: false,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Operators that survive into the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Assign,
    Plus,
    Minus,
    Bang,
    Mul,
    Div,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,
}

impl Operator {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Assign => Self::Assign,
            TokenKind::Plus => Self::Plus,
            TokenKind::Minus => Self::Minus,
            TokenKind::Bang => Self::Bang,
            TokenKind::Asterisk => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Lt => Self::Lt,
            TokenKind::Gt => Self::Gt,
            TokenKind::Lte => Self::Lte,
            TokenKind::Gte => Self::Gte,
            TokenKind::Eq => Self::Eq,
            TokenKind::NotEq => Self::NotEq,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Eq => "==",
            Self::NotEq => "!=",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Plus | Self::Minus | Self::Mul | Self::Div)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Lt | Self::Gt | Self::Lte | Self::Gte | Self::Eq | Self::NotEq
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::{Precedence, TokenKind};

    #[test]
    fn precedence_order() {
        assert!(Precedence::Lowest < Precedence::Assign);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Prefix < Precedence::Call);
        assert_eq!(TokenKind::Asterisk.precedence(), Precedence::Product);
        assert_eq!(TokenKind::Comma.precedence(), Precedence::Lowest);
        assert_eq!(TokenKind::And.precedence(), Precedence::Lowest);
    }
}
