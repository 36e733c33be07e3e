use std::fmt;

use serde::Serialize;

use super::token::{Operator, Token};

/// One AST node. `with_bracket` counts redundant parenthesizations around the
/// node and carries no meaning beyond rendering.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Expression<'src> {
    pub token: Token<'src>,
    #[serde(skip_serializing_if = "is_zero")]
    pub with_bracket: u32,
    #[serde(flatten)]
    pub kind: ExprKind<'src>,
    #[serde(skip)]
    height: usize,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "node")]
pub enum ExprKind<'src> {
    Identifier {
        value: &'src str,
    },
    /// `value` is `None` for boundary delimited variables, whose text is not a number.
    NumericLiteral {
        value: Option<f64>,
    },
    /// `value` excludes the quotes.
    StringLiteral {
        value: &'src str,
    },
    Boolean {
        value: bool,
    },
    Function {
        value: &'src str,
    },
    Call {
        function: Box<Expression<'src>>,
        arguments: Vec<Expression<'src>>,
    },
    Prefix {
        operator: Operator,
        right: Box<Expression<'src>>,
    },
    Infix {
        operator: Operator,
        left: Box<Expression<'src>>,
        right: Box<Expression<'src>>,
    },
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl<'src> Expression<'src> {
    pub fn new(token: Token<'src>, kind: ExprKind<'src>) -> Self {
        let below = match &kind {
            ExprKind::Call {
                function,
                arguments,
            } => arguments
                .iter()
                .map(Expression::height)
                .fold(function.height(), usize::max),
            ExprKind::Prefix { right, .. } => right.height(),
            ExprKind::Infix { left, right, .. } => left.height().max(right.height()),
            _ => 0,
        };

        Self {
            token,
            with_bracket: 0,
            kind,
            height: below + 1,
        }
    }

    /// Number of nodes on the longest path from this node down to a leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn offset(&self) -> usize {
        self.token.offset
    }
}

impl fmt::Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.with_bracket {
            f.write_str("(")?;
        }

        match &self.kind {
            ExprKind::Identifier { value } | ExprKind::Function { value } => {
                f.write_str(value)?
            }
            ExprKind::NumericLiteral { .. } | ExprKind::StringLiteral { .. } => {
                f.write_str(self.token.literal)?
            }
            ExprKind::Boolean { value } => write!(f, "{value}")?,
            ExprKind::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")?;
            }
            ExprKind::Prefix { operator, right } => write!(f, "{operator}{right}")?,
            ExprKind::Infix {
                operator,
                left,
                right,
            } => write!(f, "{left} {operator} {right}")?,
        }

        for _ in 0..self.with_bracket {
            f.write_str(")")?;
        }
        Ok(())
    }
}
