//! Per-run turtle state.
//!
//! Every operation charges one unit of the operation budget before it
//! acts. Scoped execution (entering a repeat iteration or a procedure
//! body) is an operation of its own, so a procedure call costs two.

use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use tortoise_graphics::painter::Painter;
use tortoise_graphics::types::{Color, FlushMode, Picture, Scalar};

use crate::command::{Command, execute_all};
use crate::error::{Diagnostic, ErrorKind, ExecResult, Log, Terminated};
use crate::expr::EvalContext;
use crate::internals::{
    Builtin, DEFAULT_ANGLE, DEFAULT_ANGLE_INCREMENT, DEFAULT_RECURSION_LIMIT, DEFAULT_STEP,
    ITERATION_VARIABLE, MAX_POSITION_STACK, MAX_RECURSION_LIMIT,
};
use crate::random::Random;

// ---------------------------------------------------------------------------
// Scopes and procedures
// ---------------------------------------------------------------------------

/// One frame of the scope chain.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: HashMap<String, Scalar>,
}

impl Scope {
    /// Frame for one `R` iteration, holding `$IT`.
    #[must_use]
    pub fn iteration(index: Scalar) -> Self {
        let mut scope = Self::default();
        scope.set(ITERATION_VARIABLE, index);
        scope
    }

    pub fn set(&mut self, name: &str, value: Scalar) {
        self.variables.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Scalar> {
        self.variables.get(name).copied()
    }
}

#[derive(Debug, Clone)]
struct Procedure {
    params: Vec<Option<String>>,
    body: Rc<[Command]>,
}

/// Saved pose for `[` / `]`.
#[derive(Debug, Clone, Copy)]
struct Pose {
    position: Point,
    heading: Scalar,
}

// ---------------------------------------------------------------------------
// Turtle
// ---------------------------------------------------------------------------

/// Everything one program run can read or change.
#[derive(Debug)]
pub struct Turtle {
    painter: Painter,
    log: Log,
    random: Random,

    operations: u64,
    /// `None` once the budget has been lifted.
    max_operations: Option<u64>,

    size: Size,
    /// Display coordinates of the turtle origin.
    origin: Point,

    /// Turtle coordinates: origin at the canvas center, Y up.
    position: Point,
    /// Degrees. Kept as computed, never normalized into [0, 360).
    heading: Scalar,
    increment: Scalar,
    step: Scalar,
    stack: Vec<Pose>,

    recursion_limit: Scalar,
    /// Index 0 is the global frame.
    scopes: Vec<Scope>,
    procedures: HashMap<String, Procedure>,
}

impl Turtle {
    /// Fresh state for a `width` x `height` canvas. Diagnostics go to `log`.
    #[must_use]
    pub fn new(size: Size, max_operations: u64, log: Log) -> Self {
        Self {
            painter: Painter::new(size),
            log,
            random: Random::new(),
            operations: 0,
            max_operations: Some(max_operations),
            size,
            origin: Point::new((size.width / 2.0).floor(), (size.height / 2.0).floor()),
            position: Point::ORIGIN,
            heading: DEFAULT_ANGLE,
            increment: DEFAULT_ANGLE_INCREMENT,
            step: DEFAULT_STEP,
            stack: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            scopes: vec![Scope::default()],
            procedures: HashMap::new(),
        }
    }

    // -- Budget --

    fn charge(&mut self) -> ExecResult {
        if let Some(limit) = self.max_operations {
            if self.operations >= limit {
                return Err(Terminated { limit });
            }
        }
        self.operations += 1;
        Ok(())
    }

    /// Let every further operation through, whatever the limit was.
    pub const fn lift_budget(&mut self) {
        self.max_operations = None;
    }

    #[must_use]
    pub const fn operations(&self) -> u64 {
        self.operations
    }

    // -- Accessors --

    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub const fn heading(&self) -> Scalar {
        self.heading
    }

    #[must_use]
    pub const fn step(&self) -> Scalar {
        self.step
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub const fn recursion_limit(&self) -> Scalar {
        self.recursion_limit
    }

    /// Global variable, ignoring built-ins and inner frames.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Scalar> {
        self.scopes.first().and_then(|s| s.get(name))
    }

    #[must_use]
    pub const fn log(&self) -> &Log {
        &self.log
    }

    pub const fn log_mut(&mut self) -> &mut Log {
        &mut self.log
    }

    // -- Pose --

    pub fn turn(&mut self, by: Option<Scalar>, clockwise: bool) -> ExecResult {
        self.charge()?;
        let by = by.unwrap_or(self.increment);
        let angle = if clockwise {
            self.heading - by
        } else {
            self.heading + by
        };
        self.heading = angle % 360.0;
        Ok(())
    }

    pub fn set_heading(&mut self, angle: Scalar) -> ExecResult {
        self.charge()?;
        self.heading = angle;
        Ok(())
    }

    pub fn set_step(&mut self, step: Scalar) -> ExecResult {
        self.charge()?;
        self.step = step;
        Ok(())
    }

    /// Move along the heading. `None` moves one step.
    pub fn forward(&mut self, distance: Option<Scalar>, pen_down: bool) -> ExecResult {
        self.charge()?;
        let distance = distance.unwrap_or(self.step);
        let target = self.position + Vec2::from_angle(self.heading.to_radians()) * distance;
        self.travel(target, pen_down);
        Ok(())
    }

    pub fn move_to(&mut self, x: Scalar, y: Scalar, pen_down: bool) -> ExecResult {
        self.charge()?;
        self.travel(Point::new(x, y), pen_down);
        Ok(())
    }

    fn travel(&mut self, target: Point, pen_down: bool) {
        let start = self.position;
        self.position = target;
        if pen_down {
            let from = self.to_display(start);
            let to = self.to_display(target);
            self.painter.line(from, to);
        }
    }

    /// Turtle coordinates to display coordinates.
    fn to_display(&self, p: Point) -> Point {
        Point::new(self.origin.x + p.x, self.origin.y - p.y)
    }

    pub fn push_position(&mut self) -> ExecResult {
        self.charge()?;
        if self.stack.len() < MAX_POSITION_STACK {
            self.stack.push(Pose {
                position: self.position,
                heading: self.heading,
            });
        } else {
            self.log.error(
                ErrorKind::PositionStack,
                "Position stack is full, command ignored",
            );
        }
        Ok(())
    }

    pub fn pop_position(&mut self) -> ExecResult {
        self.charge()?;
        if let Some(pose) = self.stack.pop() {
            self.position = pose.position;
            self.heading = pose.heading;
        } else {
            self.log.error(
                ErrorKind::PositionStack,
                "Position stack is empty, command ignored",
            );
        }
        Ok(())
    }

    // -- Style --

    pub fn set_color(&mut self, color: Color) -> ExecResult {
        self.charge()?;
        self.painter.set_color(color);
        Ok(())
    }

    /// Negative widths are taken by magnitude.
    pub fn set_stroke_width(&mut self, width: Scalar) -> ExecResult {
        self.charge()?;
        self.painter.set_width(width.abs());
        Ok(())
    }

    pub fn flush(&mut self, mode: FlushMode) -> ExecResult {
        self.charge()?;
        self.painter.flush(mode);
        Ok(())
    }

    pub fn set_background(&mut self, color: Color) -> ExecResult {
        self.charge()?;
        self.painter.background(color);
        Ok(())
    }

    // -- Procedures and scopes --

    /// Register or replace a procedure.
    pub fn define_procedure(
        &mut self,
        name: &str,
        params: Vec<Option<String>>,
        body: Rc<[Command]>,
    ) -> ExecResult {
        self.charge()?;
        log::trace!("define procedure {name} with {} parameters", params.len());
        self.procedures
            .insert(name.to_owned(), Procedure { params, body });
        Ok(())
    }

    /// Call a procedure. Missing arguments are 0, extra ones are dropped.
    /// Calls beyond the recursion limit are skipped without a diagnostic.
    pub fn call_procedure(&mut self, name: &str, args: &[Scalar]) -> ExecResult {
        self.charge()?;
        let Some(procedure) = self.procedures.get(name) else {
            self.log.error(
                ErrorKind::UndefinedProcedure,
                format!("Procedure not defined: {name}"),
            );
            return Ok(());
        };

        if !self.below_recursion_limit() {
            return Ok(());
        }

        let mut scope = Scope::default();
        for (i, param) in procedure.params.iter().enumerate() {
            if let Some(param) = param {
                scope.set(param, args.get(i).copied().unwrap_or(0.0));
            }
        }
        let body = Rc::clone(&procedure.body);
        self.execute_scoped(&body, scope)
    }

    #[expect(clippy::cast_precision_loss, reason = "depth is at most a few thousand")]
    fn below_recursion_limit(&self) -> bool {
        ((self.scopes.len() - 1) as Scalar) < self.recursion_limit
    }

    /// Run `body` with `scope` as the innermost frame.
    pub fn execute_scoped(&mut self, body: &[Command], scope: Scope) -> ExecResult {
        self.charge()?;
        self.scopes.push(scope);
        let result = execute_all(body, self);
        self.scopes.pop();
        result
    }

    /// Capped at the hard maximum. Takes effect for the next call.
    #[expect(clippy::cast_precision_loss, reason = "constant is small")]
    pub fn set_recursion_limit(&mut self, limit: Scalar) -> ExecResult {
        self.charge()?;
        self.recursion_limit = limit.min(MAX_RECURSION_LIMIT as Scalar);
        Ok(())
    }

    /// Assignments always go to the global frame.
    pub fn set_variable(&mut self, name: &str, value: Scalar) -> ExecResult {
        self.charge()?;
        self.scopes[0].set(name, value);
        Ok(())
    }

    // -- End of run --

    /// Draw the turtle glyph at the current pose.
    pub fn draw_cursor(&mut self) -> ExecResult {
        const SCALE: Scalar = 0.6;
        self.set_color(Color::rgba(0.0, 200.0, 0.0, 0.6))?;
        self.set_stroke_width(1.0)?;
        self.turn(Some(90.0), false)?;
        self.forward(Some(10.0 * SCALE), true)?;
        self.turn(Some(-120.0), false)?;
        self.forward(Some(20.0 * SCALE), true)?;
        self.turn(Some(-120.0), false)?;
        self.forward(Some(20.0 * SCALE), true)?;
        self.turn(Some(-120.0), false)?;
        self.forward(Some(10.0 * SCALE), true)?;
        self.turn(Some(-90.0), false)?;
        self.forward(Some(16.0 * SCALE), true)
    }

    /// Flush the pending path and hand over the picture and log.
    #[must_use]
    pub fn finish(self) -> (Picture, Log) {
        (self.painter.finish(), self.log)
    }
}

// ---------------------------------------------------------------------------
// Variable lookup
// ---------------------------------------------------------------------------

impl EvalContext for Turtle {
    fn variable(&mut self, name: &str) -> Option<Scalar> {
        if let Some(builtin) = Builtin::lookup(name) {
            return Some(match builtin {
                Builtin::X => self.position.x,
                Builtin::Y => self.position.y,
                Builtin::Angle => self.heading,
                Builtin::Step => self.step,
                Builtin::Width => self.size.width,
                Builtin::Height => self.size.height,
                Builtin::Random => self.random.next_scalar(),
            });
        }
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.log.push(diagnostic);
    }
}
