//! Command parser.
//!
//! Programs are sequences of one-character commands, each optionally
//! followed by a parenthesized parameter list and, for `R`, `?` and `@`,
//! a braced body. The text is upper-cased first, so `d(10)` and `D(10)`
//! are the same command.
//!
//! The parser never gives up. Unknown characters are reported and
//! skipped, an unclosed `(` ends at the next `{`, `}` or newline, and an
//! unclosed `{` ends with the enclosing text.
//!
//! | Input              | Command                                  |
//! |--------------------|------------------------------------------|
//! | `+`, `-(30)`       | [`Command::Turn`]                        |
//! | `A(90)`            | [`Command::SetHeading`]                  |
//! | `D`, `M(5)`        | [`Command::Forward`]                     |
//! | `D(1, 2)`, `H`     | [`Command::MoveTo`]                      |
//! | `R(4){...}`        | [`Command::Repeat`]                      |
//! | `@SQ(N){...}`      | [`Command::DefineProcedure`]             |
//! | `@SQ(10)`          | [`Command::CallProcedure`]               |
//! | `# ...`            | comment up to the end of the line        |

use std::rc::Rc;

use tortoise_graphics::types::{FlushMode, Scalar};

use crate::chars::{is_identifier, is_identifier_char, is_whitespace};
use crate::command::{ColorArgs, Command};
use crate::error::{Diagnostic, ErrorKind, Log};
use crate::expr::{Arg, Expression};
use crate::internals::{
    DEFAULT_ANGLE, DEFAULT_RECURSION_LIMIT, DEFAULT_STEP, DEFAULT_STROKE_WIDTH, MAX_NESTING_DEPTH,
};
use crate::token::Span;

/// Parse a whole program. Problems are written to `log`, with spans
/// counted in characters of the upper-cased text.
pub fn parse(source: &str, log: &mut Log) -> Vec<Command> {
    let mut parser = Parser::new(source, log);
    parser.parse_all()
}

/// A raw parameter: trimmed text and where it came from.
struct Param {
    text: String,
    span: Span,
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    /// End of the region being parsed; bodies are parsed in place.
    limit: usize,
    /// Bodies currently open around `pos`.
    depth: usize,
    log: &'a mut Log,
}

impl<'a> Parser<'a> {
    fn new(source: &str, log: &'a mut Log) -> Self {
        let chars: Vec<char> = source.to_uppercase().chars().collect();
        let limit = chars.len();
        Self {
            chars,
            pos: 0,
            limit,
            depth: 0,
            log,
        }
    }

    fn peek(&self) -> Option<char> {
        if self.pos < self.limit {
            self.chars.get(self.pos).copied()
        } else {
            None
        }
    }

    fn parse_all(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            let mark = self.log.len();
            self.pos += 1;
            if let Some(command) = self.command(c) {
                commands.push(command);
            }
            self.log.locate_since(mark, Span::new(start, self.pos));
        }
        commands
    }

    /// Parse `start..stop` as a nested program and continue at `resume`.
    fn parse_region(&mut self, start: usize, stop: usize, resume: usize) -> Vec<Command> {
        let outer = self.limit;
        self.pos = start;
        self.limit = stop;
        let commands = self.parse_all();
        self.limit = outer;
        self.pos = resume;
        commands
    }

    /// Parse the command whose code `c` has just been consumed.
    fn command(&mut self, c: char) -> Option<Command> {
        match c {
            '#' => {
                self.skip_line();
                None
            }
            '+' | '-' => {
                let params = self.read_parameters();
                let by = self.first_expression(&params);
                Some(Command::Turn {
                    by,
                    clockwise: c == '-',
                })
            }
            'A' => {
                let params = self.read_parameters();
                Some(Command::SetHeading(self.first_arg(&params, DEFAULT_ANGLE)))
            }
            'D' | 'M' => {
                let params = self.read_parameters();
                let mut args = self.args(&params, 0.0).into_iter();
                let pen_down = c == 'D';
                Some(match (args.next(), args.next()) {
                    (None, _) => Command::Forward {
                        distance: None,
                        pen_down,
                    },
                    (Some(distance), None) => Command::Forward {
                        distance: Some(distance),
                        pen_down,
                    },
                    (Some(x), Some(y)) => Command::MoveTo { x, y, pen_down },
                })
            }
            'H' => Some(Command::home()),
            '[' => Some(Command::Push),
            ']' => Some(Command::Pop),
            'S' => {
                let params = self.read_parameters();
                Some(Command::SetStep(self.first_arg(&params, DEFAULT_STEP)))
            }
            'C' => {
                let params = self.read_parameters();
                Some(Command::SetColor(self.color(&params)))
            }
            'W' => {
                let params = self.read_parameters();
                Some(Command::SetWidth(
                    self.first_arg(&params, DEFAULT_STROKE_WIDTH),
                ))
            }
            'E' => Some(Command::Flush(FlushMode::None)),
            'Z' => Some(Command::Flush(FlushMode::Close)),
            'F' => Some(Command::Flush(FlushMode::Fill)),
            'B' => {
                let params = self.read_parameters();
                Some(Command::Background(self.color(&params)))
            }
            'R' => {
                let params = self.read_parameters();
                let count = self.first_arg(&params, 0.0);
                let body = self.read_body()?;
                Some(Command::Repeat { count, body })
            }
            '?' => {
                let params = self.read_parameters();
                let test = self.first_arg(&params, 0.0);
                if let Some(body) = self.read_body() {
                    Some(Command::Condition { test, body })
                } else {
                    self.log.error(ErrorKind::MissingPart, "?: Body expected");
                    None
                }
            }
            '@' => self.procedure(),
            '!' => {
                let params = self.read_parameters();
                Some(Command::SetRecursionLimit(
                    self.first_arg(&params, DEFAULT_RECURSION_LIMIT),
                ))
            }
            '$' => {
                let name = self.read_identifier();
                let params = self.read_parameters();
                let value = self.first_expression(&params);
                match (name, value) {
                    (Some(name), Some(value)) => Some(Command::SetVariable {
                        name,
                        value: Arg::new(Some(value), 0.0),
                    }),
                    (Some(_), None) => {
                        self.log
                            .error(ErrorKind::MissingPart, "$: Variable value not set");
                        None
                    }
                    (None, _) => {
                        self.log
                            .error(ErrorKind::MissingPart, "$: Variable name not set");
                        None
                    }
                }
            }
            c if is_whitespace(c) => None,
            c => {
                self.log
                    .error(ErrorKind::UnknownCommand, format!("Unknown command: {c}"));
                None
            }
        }
    }

    /// `@NAME(params){body}` defines, `@NAME(args)` calls.
    fn procedure(&mut self) -> Option<Command> {
        let name = self.read_identifier();
        let params = self.read_parameters();
        let body = self.read_body();
        let Some(name) = name else {
            self.log
                .error(ErrorKind::MissingPart, "@: Procedure name not set");
            return None;
        };
        Some(match body {
            Some(body) => Command::DefineProcedure {
                name,
                params: self.parameter_names(&params),
                body: Rc::from(body),
            },
            None => Command::CallProcedure {
                name,
                args: self.args(&params, 0.0),
            },
        })
    }

    // -----------------------------------------------------------------------
    // Parameter conversion
    // -----------------------------------------------------------------------

    fn expression(&mut self, param: &Param) -> Option<Expression> {
        let mark = self.log.len();
        let expr = Expression::parse(&param.text, self.log);
        self.log.locate_since(mark, param.span);
        expr
    }

    fn first_expression(&mut self, params: &[Param]) -> Option<Expression> {
        params.first().and_then(|p| self.expression(p))
    }

    fn first_arg(&mut self, params: &[Param], default: Scalar) -> Arg {
        Arg::new(self.first_expression(params), default)
    }

    fn args(&mut self, params: &[Param], default: Scalar) -> Vec<Arg> {
        params
            .iter()
            .map(|p| Arg::new(self.expression(p), default))
            .collect()
    }

    /// Parameters that fail to parse are dropped before the arity is
    /// decided.
    fn color(&mut self, params: &[Param]) -> ColorArgs {
        let values = params.iter().filter_map(|p| self.expression(p)).collect();
        ColorArgs::from_params(values)
    }

    fn parameter_names(&mut self, params: &[Param]) -> Vec<Option<String>> {
        params
            .iter()
            .map(|p| {
                if is_identifier(&p.text) {
                    Some(p.text.strip_prefix('$').unwrap_or(&p.text).to_owned())
                } else {
                    self.log.push(
                        Diagnostic::new(
                            ErrorKind::InvalidIdentifier,
                            format!("Not an identifier: {}", p.text),
                        )
                        .with_span(p.span),
                    );
                    None
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                break;
            }
        }
    }

    /// Name directly after `@` or `$`. Spaces and tabs before it are
    /// skipped.
    fn read_identifier(&mut self) -> Option<String> {
        while let Some(c) = self.peek() {
            if c == '\n' || !is_whitespace(c) {
                break;
            }
            self.pos += 1;
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        (!name.is_empty()).then_some(name)
    }

    /// Optional `(a, b, ...)`. Nested brackets are kept in the parameter
    /// text. `{`, `}` and newline end an unclosed list.
    fn read_parameters(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        let mut depth: usize = 0;
        let mut buffer = String::new();
        let mut buffer_start = self.pos;
        let open_at = self.pos;

        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    self.pos += 1;
                    depth += 1;
                    if depth == 1 {
                        buffer_start = self.pos;
                    } else {
                        buffer.push(c);
                    }
                }
                ')' if depth == 0 => {
                    self.pos += 1;
                    self.log.warning(
                        ErrorKind::UnbalancedDelimiter,
                        "Enclosing ( not found",
                    );
                    break;
                }
                ')' => {
                    self.pos += 1;
                    depth -= 1;
                    if depth == 0 {
                        push_param(&mut params, &buffer, buffer_start, self.pos - 1);
                        return params;
                    }
                    buffer.push(c);
                }
                ',' => {
                    self.pos += 1;
                    match depth {
                        0 => break,
                        1 => {
                            push_param(&mut params, &buffer, buffer_start, self.pos - 1);
                            buffer.clear();
                            buffer_start = self.pos;
                        }
                        _ => buffer.push(c),
                    }
                }
                '{' | '}' | '\n' => break,
                _ if depth > 0 => {
                    self.pos += 1;
                    buffer.push(c);
                }
                _ if is_whitespace(c) => self.pos += 1,
                _ => break,
            }
        }

        push_param(&mut params, &buffer, buffer_start, self.pos);
        if depth > 0 {
            self.log.push(
                Diagnostic::warning(
                    ErrorKind::UnbalancedDelimiter,
                    "Enclosing ) not found",
                )
                .with_span(Span::new(open_at, self.pos)),
            );
        }
        params
    }

    /// Optional `{...}`, parsed as a nested program. `None` when no body
    /// follows.
    fn read_body(&mut self) -> Option<Vec<Command>> {
        let mut depth: usize = 0;
        let mut body_start = self.pos;

        while let Some(c) = self.peek() {
            match c {
                '{' => {
                    self.pos += 1;
                    depth += 1;
                    if depth == 1 {
                        body_start = self.pos;
                    }
                }
                '}' if depth == 0 => {
                    self.pos += 1;
                    self.log
                        .warning(ErrorKind::UnbalancedDelimiter, "Enclosing { not found");
                    return Some(Vec::new());
                }
                '}' => {
                    self.pos += 1;
                    depth -= 1;
                    if depth == 0 {
                        let resume = self.pos;
                        return Some(self.parse_body(body_start, resume - 1, resume));
                    }
                }
                _ if depth > 0 || is_whitespace(c) => self.pos += 1,
                _ => return None,
            }
        }

        if depth == 0 {
            return None;
        }
        self.log.push(
            Diagnostic::warning(
                ErrorKind::UnbalancedDelimiter,
                "Enclosing } not found",
            )
            .with_span(Span::new(body_start.saturating_sub(1), self.pos)),
        );
        let end = self.pos;
        Some(self.parse_body(body_start, end, end))
    }

    /// Parse a body one level deeper. Past [`MAX_NESTING_DEPTH`] the body
    /// is reported and skipped.
    fn parse_body(&mut self, start: usize, stop: usize, resume: usize) -> Vec<Command> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.log.push(
                Diagnostic::new(ErrorKind::NestingTooDeep, "Nesting too deep, body ignored")
                    .with_span(Span::new(start.saturating_sub(1), resume)),
            );
            self.pos = resume;
            return Vec::new();
        }
        self.depth += 1;
        let body = self.parse_region(start, stop, resume);
        self.depth -= 1;
        body
    }
}

fn push_param(params: &mut Vec<Param>, buffer: &str, start: usize, end: usize) {
    let text = buffer.trim();
    if !text.is_empty() {
        params.push(Param {
            text: text.to_owned(),
            span: Span::new(start, end),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
