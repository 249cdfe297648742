//! Program runner.
//!
//! [`Interpreter::run`] parses a program, executes it against a fresh
//! [`turtle::Turtle`] and keeps the resulting picture and diagnostics.
//! Nothing carries over between runs.

pub mod turtle;


use kurbo::Size;
use tortoise_graphics::types::{Picture, Scalar};

use crate::command::execute_all;
use crate::error::{Diagnostic, ErrorKind, ExecResult, Log};
use crate::internals::DEFAULT_MAX_OPERATIONS;
use crate::parser;

use turtle::Turtle;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Canvas width in display units. Default: 500.
    pub width: Scalar,
    /// Canvas height in display units. Default: 500.
    pub height: Scalar,
    /// Operations allowed before the run is stopped. Default: 1,000,000.
    pub max_operations: u64,
    /// Draw the turtle glyph at its final pose. Default: false.
    pub draw_cursor: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            max_operations: DEFAULT_MAX_OPERATIONS,
            draw_cursor: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Runs programs and holds the output of the latest run.
#[derive(Debug, Default)]
pub struct Interpreter {
    pub options: RunOptions,
    /// Diagnostics of the latest run, in the order they were produced.
    pub errors: Vec<Diagnostic>,
    picture: Picture,
    operations: u64,
}

impl Interpreter {
    /// Create an interpreter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: RunOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Run `source`, replacing the previous picture and diagnostics.
    ///
    /// Running out of operations is not an error of this function: it is
    /// recorded as a final diagnostic and everything drawn so far is kept.
    pub fn run(&mut self, source: &str) {
        let mut log = Log::new();
        let program = parser::parse(source, &mut log);
        log::debug!(
            "parsed {} top-level commands, {} diagnostics",
            program.len(),
            log.len()
        );

        let size = Size::new(self.options.width, self.options.height);
        let mut turtle = Turtle::new(size, self.options.max_operations, log);

        let outcome = execute_all(&program, &mut turtle);
        record_termination(&mut turtle, outcome);

        if self.options.draw_cursor {
            turtle.lift_budget();
            let outcome = turtle.draw_cursor();
            record_termination(&mut turtle, outcome);
        }

        self.operations = turtle.operations();
        log::debug!("run finished after {} operations", self.operations);

        let (picture, log) = turtle.finish();
        self.picture = picture;
        self.errors = log.into_entries();
    }

    /// Picture of the latest run.
    #[must_use]
    pub const fn picture(&self) -> &Picture {
        &self.picture
    }

    /// Operations charged by the latest run.
    #[must_use]
    pub const fn operations(&self) -> u64 {
        self.operations
    }

    /// Whether the latest run produced an error-level diagnostic.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|d| d.severity == crate::error::Severity::Error)
    }
}

fn record_termination(turtle: &mut Turtle, outcome: ExecResult) {
    if let Err(stop) = outcome {
        log::debug!("run terminated: {stop}");
        turtle
            .log_mut()
            .error(ErrorKind::LimitExceeded, stop.to_string());
    }
}
