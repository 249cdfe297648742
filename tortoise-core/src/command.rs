//! Executable command tree.
//!
//! The parser turns program text into a list of [`Command`]s. Each variant
//! performs exactly one turtle operation, or drives a nested command list
//! (`R`, `?`, `@`). Arguments are evaluated at the moment the command runs,
//! so bodies see the current values of `$X`, `$IT` and friends.

use std::rc::Rc;

use tortoise_graphics::types::{Color, FlushMode, Scalar};

use crate::error::ExecResult;
use crate::expr::{Arg, EvalContext, Expression};
use crate::interpreter::turtle::{Scope, Turtle};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `+` / `-`: relative turn. `None` turns by the angle increment.
    Turn {
        by: Option<Expression>,
        clockwise: bool,
    },
    /// `A`: absolute heading.
    SetHeading(Arg),
    /// `D(n)` / `M(n)`: move along the heading. `None` moves one step.
    Forward {
        distance: Option<Arg>,
        pen_down: bool,
    },
    /// `D(x, y)` / `M(x, y)` / `H`: move to an absolute position.
    MoveTo { x: Arg, y: Arg, pen_down: bool },
    /// `[`
    Push,
    /// `]`
    Pop,
    /// `S`
    SetStep(Arg),
    /// `C`
    SetColor(ColorArgs),
    /// `W`
    SetWidth(Arg),
    /// `E` / `Z` / `F`
    Flush(FlushMode),
    /// `B`
    Background(ColorArgs),
    /// `R(n){...}`: the count is floored and evaluated once.
    Repeat { count: Arg, body: Vec<Self> },
    /// `?(cond){...}`
    Condition { test: Arg, body: Vec<Self> },
    /// `@NAME(P1, P2){...}`. Invalid parameter names are kept as `None`
    /// so later arguments still bind by position.
    DefineProcedure {
        name: String,
        params: Vec<Option<String>>,
        body: Rc<[Self]>,
    },
    /// `@NAME(a, b)`
    CallProcedure { name: String, args: Vec<Arg> },
    /// `!(n)`
    SetRecursionLimit(Arg),
    /// `$NAME(value)`
    SetVariable { name: String, value: Arg },
}

impl Command {
    /// `H`: jump to the origin without drawing.
    #[must_use]
    pub const fn home() -> Self {
        Self::MoveTo {
            x: Arg::constant(0.0),
            y: Arg::constant(0.0),
            pen_down: false,
        }
    }

    pub fn execute(&self, turtle: &mut Turtle) -> ExecResult {
        match self {
            Self::Turn { by, clockwise } => {
                let by = by.as_ref().and_then(|e| e.eval(turtle));
                turtle.turn(by, *clockwise)
            }
            Self::SetHeading(arg) => {
                let angle = arg.eval(turtle);
                turtle.set_heading(angle)
            }
            Self::Forward { distance, pen_down } => {
                let distance = distance.as_ref().map(|arg| arg.eval(turtle));
                turtle.forward(distance, *pen_down)
            }
            Self::MoveTo { x, y, pen_down } => {
                let x = x.eval(turtle);
                let y = y.eval(turtle);
                turtle.move_to(x, y, *pen_down)
            }
            Self::Push => turtle.push_position(),
            Self::Pop => turtle.pop_position(),
            Self::SetStep(arg) => {
                let step = arg.eval(turtle);
                turtle.set_step(step)
            }
            Self::SetColor(color) => {
                let color = color.eval(turtle);
                turtle.set_color(color)
            }
            Self::SetWidth(arg) => {
                let width = arg.eval(turtle);
                turtle.set_stroke_width(width)
            }
            Self::Flush(mode) => turtle.flush(*mode),
            Self::Background(color) => {
                let color = color.eval(turtle);
                turtle.set_background(color)
            }
            Self::Repeat { count, body } => {
                let count = count.eval(turtle).floor();
                let mut i = 0.0;
                while i < count {
                    turtle.execute_scoped(body, Scope::iteration(i))?;
                    i += 1.0;
                }
                Ok(())
            }
            Self::Condition { test, body } => {
                if test.eval(turtle) == 0.0 {
                    Ok(())
                } else {
                    execute_all(body, turtle)
                }
            }
            Self::DefineProcedure { name, params, body } => {
                turtle.define_procedure(name, params.clone(), Rc::clone(body))
            }
            Self::CallProcedure { name, args } => {
                let values: Vec<Scalar> = args.iter().map(|arg| arg.eval(turtle)).collect();
                turtle.call_procedure(name, &values)
            }
            Self::SetRecursionLimit(arg) => {
                let limit = arg.eval(turtle).floor();
                turtle.set_recursion_limit(limit)
            }
            Self::SetVariable { name, value } => {
                let value = value.eval(turtle);
                turtle.set_variable(name, value)
            }
        }
    }
}

/// Run `commands` in order, stopping at the first termination.
pub fn execute_all(commands: &[Command], turtle: &mut Turtle) -> ExecResult {
    for command in commands {
        command.execute(turtle)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Color arguments
// ---------------------------------------------------------------------------

/// Arguments of `C` and `B`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorArgs {
    /// One value: opaque gray, evaluated once.
    Gray(Arg),
    Rgba { r: Arg, g: Arg, b: Arg, a: Arg },
}

impl ColorArgs {
    /// Build from the parameters that parsed. Channels missing from the
    /// end are 0 and alpha is 1; anything past the fourth is ignored.
    #[must_use]
    pub fn from_params(params: Vec<Expression>) -> Self {
        let mut params = params.into_iter();
        match (params.next(), params.next()) {
            (Some(v), None) => Self::Gray(Arg::new(Some(v), 0.0)),
            (r, g) => Self::Rgba {
                r: Arg::new(r, 0.0),
                g: Arg::new(g, 0.0),
                b: Arg::new(params.next(), 0.0),
                a: Arg::new(params.next(), 1.0),
            },
        }
    }

    pub fn eval(&self, ctx: &mut dyn EvalContext) -> Color {
        match self {
            Self::Gray(v) => Color::gray(v.eval(ctx)),
            Self::Rgba { r, g, b, a } => {
                let r = r.eval(ctx);
                let g = g.eval(ctx);
                let b = b.eval(ctx);
                Color::rgba(r, g, b, a.eval(ctx))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
