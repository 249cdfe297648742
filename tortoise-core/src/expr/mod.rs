//! Arithmetic and logical expressions inside command parameters.
//!
//! Text is tokenized by [`lexer::Lexer`], reordered into reverse-Polish
//! form with the shunting-yard algorithm and then either evaluated
//! straight away (no variables) or kept for evaluation each time the
//! owning command runs.

pub mod lexer;
pub mod operators;

use tortoise_graphics::types::Scalar;

use crate::error::{Diagnostic, ErrorKind, Log};
use crate::token::Token;

use lexer::Lexer;
use operators::{Apply, Operator};

/// Results are clamped to the 32-bit signed integer range.
const MIN_RESULT: Scalar = -2_147_483_648.0;
const MAX_RESULT: Scalar = 2_147_483_647.0;

// ---------------------------------------------------------------------------
// Evaluation context
// ---------------------------------------------------------------------------

/// What an expression needs from its surroundings while it is evaluated.
pub trait EvalContext {
    /// Current value of a variable (name upper-cased, without `$`).
    ///
    /// Takes `&mut self` because reading `$RND` advances the generator.
    fn variable(&mut self, name: &str) -> Option<Scalar>;

    /// Record a problem found during evaluation.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A bare log evaluates constant expressions: it knows no variables.
impl EvalContext for Log {
    fn variable(&mut self, _name: &str) -> Option<Scalar> {
        None
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

// ---------------------------------------------------------------------------
// Compiled form
// ---------------------------------------------------------------------------

/// One step of a reverse-Polish program.
#[derive(Debug, Clone, PartialEq)]
pub enum Rpn {
    Number(Scalar),
    Variable(String),
    Apply(&'static Operator),
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Value known at parse time.
    Constant(Scalar),
    /// Depends on variables; evaluated every time it is used.
    Deferred(Box<[Rpn]>),
}

impl Expression {
    /// Parse `text`. Returns `None` when the text is empty or a constant
    /// expression fails to evaluate. Problems are written to `log`.
    pub fn parse(text: &str, log: &mut Log) -> Option<Self> {
        let mut lexer = Lexer::new(text, log);
        let program = shunting_yard(&mut lexer);
        let deferred = lexer.has_variable();

        let program = program?;
        if deferred {
            Some(Self::Deferred(program.into_boxed_slice()))
        } else {
            evaluate(&program, log).map(Self::Constant)
        }
    }

    /// Evaluate against `ctx`. `None` means the value is absent and the
    /// caller should fall back to its default.
    pub fn eval(&self, ctx: &mut dyn EvalContext) -> Option<Scalar> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Deferred(program) => evaluate(program, ctx),
        }
    }

    /// The value, if it was known at parse time.
    #[must_use]
    pub const fn as_constant(&self) -> Option<Scalar> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Deferred(_) => None,
        }
    }
}

/// An expression together with the value used when it evaluates to
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub expr: Expression,
    pub default: Scalar,
}

impl Arg {
    /// A missing expression becomes the constant `default`.
    #[must_use]
    pub fn new(expr: Option<Expression>, default: Scalar) -> Self {
        Self {
            expr: expr.unwrap_or(Expression::Constant(default)),
            default,
        }
    }

    #[must_use]
    pub const fn constant(value: Scalar) -> Self {
        Self {
            expr: Expression::Constant(value),
            default: value,
        }
    }

    pub fn eval(&self, ctx: &mut dyn EvalContext) -> Scalar {
        self.expr.eval(ctx).unwrap_or(self.default)
    }
}

// ---------------------------------------------------------------------------
// Shunting-yard
// ---------------------------------------------------------------------------

enum Stacked {
    Open,
    Operator(&'static Operator),
}

/// Infix tokens to reverse-Polish order. `None` on an unclosed `(`.
fn shunting_yard(lexer: &mut Lexer<'_>) -> Option<Vec<Rpn>> {
    let mut out = Vec::new();
    let mut stack: Vec<Stacked> = Vec::new();
    let mut stray_close = false;

    while let Some(token) = lexer.next_token() {
        match token {
            Token::Number(n) => out.push(Rpn::Number(n)),
            Token::Variable(name) => out.push(Rpn::Variable(name)),
            Token::Operator(op) => {
                while let Some(&Stacked::Operator(head)) = stack.last() {
                    if !op.yields_to(head) {
                        break;
                    }
                    out.push(Rpn::Apply(head));
                    stack.pop();
                }
                stack.push(Stacked::Operator(op));
            }
            Token::Open => stack.push(Stacked::Open),
            Token::Close => loop {
                match stack.pop() {
                    Some(Stacked::Operator(op)) => out.push(Rpn::Apply(op)),
                    Some(Stacked::Open) => break,
                    None => {
                        stray_close = true;
                        break;
                    }
                }
            },
        }
    }

    if stray_close {
        lexer.log().push(Diagnostic::warning(
            ErrorKind::InvalidExpression,
            "Unmatched ) in expression",
        ));
    }

    let mut unclosed = false;
    while let Some(entry) = stack.pop() {
        match entry {
            Stacked::Operator(op) => out.push(Rpn::Apply(op)),
            Stacked::Open => unclosed = true,
        }
    }
    if unclosed {
        lexer
            .log()
            .error(ErrorKind::InvalidExpression, "Unmatched ( in expression");
        return None;
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn evaluate(program: &[Rpn], ctx: &mut dyn EvalContext) -> Option<Scalar> {
    let mut stack: Vec<Scalar> = Vec::with_capacity(program.len());

    for step in program {
        match step {
            Rpn::Number(n) => stack.push(*n),
            Rpn::Variable(name) => {
                let value = ctx.variable(name).unwrap_or_else(|| {
                    ctx.report(Diagnostic::new(
                        ErrorKind::UndefinedVariable,
                        format!("Variable not defined: {name}"),
                    ));
                    0.0
                });
                stack.push(value);
            }
            Rpn::Apply(op) => {
                if stack.len() < op.arity() {
                    ctx.report(Diagnostic::new(
                        ErrorKind::InvalidExpression,
                        format!("Not enough operands for {}", op.symbol),
                    ));
                    return None;
                }
                let value = match op.apply {
                    Apply::Unary(f) => {
                        let a = stack.pop()?;
                        f(a)
                    }
                    Apply::Binary(f) => {
                        let b = stack.pop()?;
                        let a = stack.pop()?;
                        f(a, b)
                    }
                };
                stack.push(value);
            }
        }
    }

    match stack.as_slice() {
        [] => None,
        [value] if value.is_finite() => {
            if *value > MAX_RESULT || *value < MIN_RESULT {
                ctx.report(Diagnostic::warning(
                    ErrorKind::Truncated,
                    "Expression result truncated",
                ));
            }
            Some(value.clamp(MIN_RESULT, MAX_RESULT))
        }
        [_] => {
            ctx.report(Diagnostic::new(
                ErrorKind::InvalidExpression,
                "Expression result is not a number",
            ));
            None
        }
        _ => {
            ctx.report(Diagnostic::new(
                ErrorKind::InvalidExpression,
                "Operator expected",
            ));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn constant(text: &str) -> Option<Scalar> {
        let mut log = Log::new();
        Expression::parse(text, &mut log).and_then(|e| e.as_constant())
    }

    fn constant_with_log(text: &str) -> (Option<Scalar>, Log) {
        let mut log = Log::new();
        let v = Expression::parse(text, &mut log).and_then(|e| e.as_constant());
        (v, log)
    }

    struct Vars {
        values: HashMap<String, Scalar>,
        log: Log,
    }

    impl Vars {
        fn new(pairs: &[(&str, Scalar)]) -> Self {
            Self {
                values: pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
                log: Log::new(),
            }
        }
    }

    impl EvalContext for Vars {
        fn variable(&mut self, name: &str) -> Option<Scalar> {
            self.values.get(name).copied()
        }

        fn report(&mut self, diagnostic: Diagnostic) {
            self.log.push(diagnostic);
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(constant("1+2*3"), Some(7.0));
        assert_eq!(constant("(1+2)*3"), Some(9.0));
        assert_eq!(constant("10-4-3"), Some(3.0));
        assert_eq!(constant("2^3^2"), Some(512.0));
        assert_eq!(constant("7%4"), Some(3.0));
        assert_eq!(constant("9\u{F7}3\u{D7}2"), Some(6.0));
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(constant("2(3)"), Some(6.0));
        assert_eq!(constant("(2)(3)"), Some(6.0));
    }

    #[test]
    fn not_equal_merges() {
        assert_eq!(constant("3!=4"), Some(1.0));
        assert_eq!(constant("3!=3"), Some(0.0));
        assert_eq!(constant("2<=2"), Some(1.0));
        assert_eq!(constant("1>=2"), Some(0.0));
    }

    #[test]
    fn unary_minus_binds_tighter_than_power() {
        assert_eq!(constant("-2^2"), Some(4.0));
        assert_eq!(constant("2^-1"), Some(0.5));
        assert_eq!(constant("--3"), Some(3.0));
    }

    #[test]
    fn logic() {
        assert_eq!(constant("1<2 & 2<3"), Some(1.0));
        assert_eq!(constant("0 | 0"), Some(0.0));
        assert_eq!(constant("!0"), Some(1.0));
        assert_eq!(constant("1+1=2"), Some(1.0));
    }

    #[test]
    fn roots_and_powers() {
        assert_eq!(constant("\u{221A}16"), Some(4.0));
        assert_eq!(constant("3\u{B2}"), Some(9.0));
        assert_eq!(constant("2\u{B3}+1"), None, "postfix then + reads as prefix +");
    }

    #[test]
    fn empty_is_absent_without_log() {
        let (v, log) = constant_with_log("   ");
        assert_eq!(v, None);
        assert!(log.is_empty());
    }

    #[test]
    fn truncation_warns() {
        let (v, log) = constant_with_log("2^40");
        assert_eq!(v, Some(MAX_RESULT));
        assert_eq!(log.entries()[0].message, "Expression result truncated");
        assert_eq!(log.entries()[0].severity, crate::error::Severity::Warning);

        let (v, _) = constant_with_log("-(2^40)");
        assert_eq!(v, Some(MIN_RESULT));
    }

    #[test]
    fn division_by_zero_is_not_a_number() {
        let (v, log) = constant_with_log("1/0");
        assert_eq!(v, None);
        assert_eq!(log.entries()[0].message, "Expression result is not a number");
    }

    #[test]
    fn operand_errors() {
        let (v, log) = constant_with_log("1+");
        assert_eq!(v, None);
        assert_eq!(log.entries()[0].message, "Not enough operands for +");

        let (v, log) = constant_with_log("1 2");
        assert_eq!(v, None);
        assert_eq!(log.entries()[0].message, "Operator expected");
    }

    #[test]
    fn unmatched_brackets() {
        let (v, log) = constant_with_log("(1+2");
        assert_eq!(v, None);
        assert!(log.has_errors());

        let (v, log) = constant_with_log("1+2)");
        assert_eq!(v, Some(3.0));
        assert_eq!(log.entries()[0].severity, crate::error::Severity::Warning);
    }

    #[test]
    fn variables_are_deferred() {
        let mut log = Log::new();
        let expr = Expression::parse("$x*2+1", &mut log).expect("parsed");
        assert!(expr.as_constant().is_none());

        let mut vars = Vars::new(&[("X", 5.0)]);
        assert_eq!(expr.eval(&mut vars), Some(11.0));
        vars.values.insert("X".into(), 1.0);
        assert_eq!(expr.eval(&mut vars), Some(3.0));
    }

    #[test]
    fn undefined_variable_reads_zero() {
        let mut log = Log::new();
        let expr = Expression::parse("$NOPE+4", &mut log).expect("parsed");
        let mut vars = Vars::new(&[]);
        assert_eq!(expr.eval(&mut vars), Some(4.0));
        assert_eq!(vars.log.entries()[0].message, "Variable not defined: NOPE");
    }

    #[test]
    fn arg_falls_back_to_default() {
        let mut log = Log::new();
        let arg = Arg::new(Expression::parse("1/$Z", &mut log), 20.0);
        let mut vars = Vars::new(&[("Z", 0.0)]);
        assert_eq!(arg.eval(&mut vars), 20.0);

        let arg = Arg::new(None, 7.0);
        assert_eq!(arg.eval(&mut vars), 7.0);
    }

    #[test]
    fn constants_are_deterministic() {
        let a = constant("3.5*(2-7)^2/3");
        let b = constant("3.5*(2-7)^2/3");
        assert_eq!(a, b);
    }
}
