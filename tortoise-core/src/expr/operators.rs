//! Operator table for the expression engine.
//!
//! Priorities run from 1 (loosest, `|`) to 14 (tightest, prefix `!` `+`
//! `-`). Comparison and logical operators yield 0 or 1.

use std::fmt;

use tortoise_graphics::types::Scalar;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// How an operator combines its operands.
#[derive(Clone, Copy)]
pub enum Apply {
    Unary(fn(Scalar) -> Scalar),
    Binary(fn(Scalar, Scalar) -> Scalar),
}

/// One entry of the operator table.
#[derive(Clone, Copy)]
pub struct Operator {
    pub symbol: char,
    pub priority: u8,
    pub assoc: Assoc,
    pub apply: Apply,
}

impl Operator {
    /// Number of operands consumed.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self.apply {
            Apply::Unary(_) => 1,
            Apply::Binary(_) => 2,
        }
    }

    #[must_use]
    pub const fn is_unary(&self) -> bool {
        matches!(self.apply, Apply::Unary(_))
    }

    /// Whether `head`, sitting on the operator stack, must be output before
    /// `self` is pushed.
    #[must_use]
    pub const fn yields_to(&self, head: &Self) -> bool {
        match self.assoc {
            Assoc::Left => self.priority <= head.priority,
            Assoc::Right => self.priority < head.priority,
        }
    }

    /// The two-character operator formed by `self` followed by `=`.
    #[must_use]
    pub fn merged_with_eq(&self) -> Option<&'static Self> {
        match self.symbol {
            '!' => binary('\u{2260}'),
            '<' => binary('\u{2264}'),
            '>' => binary('\u{2265}'),
            _ => None,
        }
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.arity() == other.arity()
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_unary() { "unary" } else { "binary" };
        write!(f, "{kind} {}", self.symbol)
    }
}

const fn truth(b: bool) -> Scalar {
    if b { 1.0 } else { 0.0 }
}

const fn op(symbol: char, priority: u8, assoc: Assoc, apply: Apply) -> Operator {
    Operator {
        symbol,
        priority,
        assoc,
        apply,
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

static UNARY: [Operator; 7] = [
    op('!', 14, Assoc::Right, Apply::Unary(|a| truth(a == 0.0))),
    op('+', 14, Assoc::Right, Apply::Unary(|a| a)),
    op('-', 14, Assoc::Right, Apply::Unary(|a| -a)),
    op('\u{221A}', 13, Assoc::Right, Apply::Unary(Scalar::sqrt)),
    op('\u{221B}', 13, Assoc::Right, Apply::Unary(|a| a.powf(1.0 / 3.0))),
    op('\u{B2}', 13, Assoc::Left, Apply::Unary(|a| a.powi(2))),
    op('\u{B3}', 13, Assoc::Left, Apply::Unary(|a| a.powi(3))),
];

#[expect(clippy::float_cmp, reason = "language equality is exact")]
static BINARY: [Operator; 16] = [
    op('|', 1, Assoc::Left, Apply::Binary(|a, b| truth(a != 0.0 || b != 0.0))),
    op('&', 2, Assoc::Left, Apply::Binary(|a, b| truth(a != 0.0 && b != 0.0))),
    op('=', 3, Assoc::Left, Apply::Binary(|a, b| truth(a == b))),
    op('\u{2260}', 3, Assoc::Left, Apply::Binary(|a, b| truth(a != b))),
    op('<', 4, Assoc::Left, Apply::Binary(|a, b| truth(a < b))),
    op('\u{2264}', 4, Assoc::Left, Apply::Binary(|a, b| truth(a <= b))),
    op('>', 4, Assoc::Left, Apply::Binary(|a, b| truth(a > b))),
    op('\u{2265}', 4, Assoc::Left, Apply::Binary(|a, b| truth(a >= b))),
    op('+', 10, Assoc::Left, Apply::Binary(|a, b| a + b)),
    op('-', 10, Assoc::Left, Apply::Binary(|a, b| a - b)),
    op('*', 11, Assoc::Left, Apply::Binary(|a, b| a * b)),
    op('\u{D7}', 11, Assoc::Left, Apply::Binary(|a, b| a * b)),
    op('/', 11, Assoc::Left, Apply::Binary(|a, b| a / b)),
    op('\u{F7}', 11, Assoc::Left, Apply::Binary(|a, b| a / b)),
    op('%', 11, Assoc::Left, Apply::Binary(|a, b| a % b)),
    op('^', 12, Assoc::Right, Apply::Binary(Scalar::powf)),
];

/// Look up a prefix/postfix operator.
#[must_use]
pub fn unary(symbol: char) -> Option<&'static Operator> {
    UNARY.iter().find(|op| op.symbol == symbol)
}

/// Look up an infix operator.
#[must_use]
pub fn binary(symbol: char) -> Option<&'static Operator> {
    BINARY.iter().find(|op| op.symbol == symbol)
}

/// Look up any operator, preferring the infix form for `+` and `-`.
#[must_use]
pub fn lookup(symbol: char) -> Option<&'static Operator> {
    binary(symbol).or_else(|| unary(symbol))
}

/// The infix `*` used for implicit multiplication.
#[must_use]
pub fn times() -> &'static Operator {
    &BINARY[10]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn apply1(symbol: char, a: Scalar) -> Scalar {
        match unary(symbol).expect("unary operator").apply {
            Apply::Unary(f) => f(a),
            Apply::Binary(_) => panic!("not unary"),
        }
    }

    fn apply2(symbol: char, a: Scalar, b: Scalar) -> Scalar {
        match binary(symbol).expect("binary operator").apply {
            Apply::Binary(f) => f(a, b),
            Apply::Unary(_) => panic!("not binary"),
        }
    }

    #[test]
    fn times_is_star() {
        assert_eq!(times().symbol, '*');
        assert_eq!(times().arity(), 2);
    }

    #[test]
    fn lookup_prefers_binary() {
        assert_eq!(lookup('-').map(Operator::arity), Some(2));
        assert_eq!(lookup('!').map(Operator::arity), Some(1));
        assert!(lookup('a').is_none());
    }

    #[test]
    fn logical_results_are_zero_or_one() {
        assert_eq!(apply1('!', 0.0), 1.0);
        assert_eq!(apply1('!', 5.0), 0.0);
        assert_eq!(apply2('|', 0.0, 2.0), 1.0);
        assert_eq!(apply2('&', 3.0, 0.0), 0.0);
        assert_eq!(apply2('\u{2264}', 2.0, 2.0), 1.0);
    }

    #[test]
    fn powers_and_roots() {
        assert_eq!(apply1('\u{B2}', 3.0), 9.0);
        assert_eq!(apply1('\u{B3}', 2.0), 8.0);
        assert_eq!(apply1('\u{221A}', 16.0), 4.0);
        assert!((apply1('\u{221B}', 27.0) - 3.0).abs() < 1e-12);
        assert_eq!(apply2('^', 2.0, 10.0), 1024.0);
    }

    #[test]
    fn remainder_truncates() {
        assert_eq!(apply2('%', -7.0, 3.0), -1.0);
    }

    #[test]
    fn precedence_order() {
        let pow = binary('^').expect("^");
        let mul = binary('*').expect("*");
        let add = binary('+').expect("+");
        assert!(add.yields_to(mul));
        assert!(!pow.yields_to(pow), "^ is right-associative");
        assert!(add.yields_to(add), "+ is left-associative");
    }

    #[test]
    fn merged_operators() {
        let not = unary('!').expect("!");
        assert_eq!(not.merged_with_eq().map(|o| o.symbol), Some('\u{2260}'));
        assert!(times().merged_with_eq().is_none());
    }
}
