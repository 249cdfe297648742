//! Source spans and expression tokens.
//!
//! Expression text is split into five token kinds:
//! - **Number**: a non-negative literal (`-` is always an operator)
//! - **Variable**: `$NAME`, stored without the `$`
//! - **Operator**: an entry of the operator table
//! - **Open** / **Close**: round brackets

use tortoise_graphics::types::Scalar;

use crate::expr::operators::Operator;

// ---------------------------------------------------------------------------
// Source location
// ---------------------------------------------------------------------------

/// A character-offset span in the (upper-cased) program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

// ---------------------------------------------------------------------------
// Expression tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Scalar),
    Variable(String),
    Operator(&'static Operator),
    Open,
    Close,
}

impl Token {
    /// Tokens that can end an operand: a number, a variable or `)`.
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Variable(_) | Self::Close)
    }

    /// Tokens that can start an operand: a number, a variable or `(`.
    #[must_use]
    pub const fn starts_operand(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Variable(_) | Self::Open)
    }

    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// The operator if this is an operator token.
    #[must_use]
    pub const fn operator(&self) -> Option<&'static Operator> {
        match self {
            Self::Operator(op) => Some(*op),
            _ => None,
        }
    }
}
