//! Diagnostics for the Tortoise parser and interpreter.
//!
//! Nothing a program does can make a run fail: problems are recorded as
//! [`Diagnostic`]s in a [`Log`] and execution carries on. The only way a
//! run stops early is [`Terminated`], raised when the operation budget is
//! used up.

use std::fmt;

use crate::token::Span;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity level for diagnostics. None of them halts execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// One log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Location in the upper-cased program text, if known.
    pub span: Option<Span>,
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a new diagnostic with [`Severity::Error`].
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            severity: Severity::Error,
        }
    }

    /// Shorthand for a [`Severity::Warning`] diagnostic.
    #[must_use]
    pub fn warning(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message).with_severity(Severity::Warning)
    }

    /// Attach a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span {
            write!(f, "[{}..{}] ", span.start, span.end)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // -- Parse --
    /// Character that does not start a command.
    UnknownCommand,
    /// Missing `)` or `}`, or a stray closing one.
    UnbalancedDelimiter,
    /// A required part of a command is absent (body, name, value).
    MissingPart,
    /// Procedure parameter that is not a valid name.
    InvalidIdentifier,
    /// Bodies nested deeper than the parser accepts.
    NestingTooDeep,

    // -- Expression --
    /// Malformed expression text or evaluation failure.
    InvalidExpression,
    /// Result outside the 32-bit integer range was clamped.
    Truncated,
    /// Variable read that no scope defines.
    UndefinedVariable,

    // -- Runtime --
    /// Position stack overflow or underflow.
    PositionStack,
    /// Call to a procedure that was never defined.
    UndefinedProcedure,

    // -- Budget --
    /// The run was stopped by the operation limit.
    LimitExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::UnbalancedDelimiter => write!(f, "unbalanced delimiter"),
            Self::MissingPart => write!(f, "missing part"),
            Self::InvalidIdentifier => write!(f, "invalid identifier"),
            Self::NestingTooDeep => write!(f, "nesting too deep"),
            Self::InvalidExpression => write!(f, "invalid expression"),
            Self::Truncated => write!(f, "truncated result"),
            Self::UndefinedVariable => write!(f, "undefined variable"),
            Self::PositionStack => write!(f, "position stack"),
            Self::UndefinedProcedure => write!(f, "undefined procedure"),
            Self::LimitExceeded => write!(f, "limit exceeded"),
        }
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Log {
    entries: Vec<Diagnostic>,
}

impl Log {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::trace!("{}: {diagnostic}", diagnostic.severity);
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, message));
    }

    pub fn warning(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.push(Diagnostic::warning(kind, message));
    }

    /// Give every entry recorded since `mark` that has no span the span
    /// `span`.
    pub fn locate_since(&mut self, mark: usize, span: Span) {
        for d in self.entries.iter_mut().skip(mark) {
            if d.span.is_none() {
                d.span = Some(span);
            }
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry has [`Severity::Error`].
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

/// The run used up its operation budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminated {
    /// The configured maximum number of operations.
    pub limit: u64,
}

impl fmt::Display for Terminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command limit exceeded, limit={}", self.limit)
    }
}

impl std::error::Error for Terminated {}

/// Result of executing a command.
pub type ExecResult = Result<(), Terminated>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
