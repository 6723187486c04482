//! Diagnostic module - error collection and reporting.
//!
//! Lexical and syntactic errors are recovered locally and never abort a
//! compilation, so they are collected here rather than propagated as `Err`
//! values. The [`Handler`] accumulates [`Diagnostic`] entries in source
//! order; the driver renders them after each phase.
//!
//! Locations are line-granular: the front end tags every token with the
//! line it started on, and that is the only position information a
//! diagnostic carries.

use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that marks the compilation as failed.
    Error,
    /// A warning that does not prevent compilation.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
        }
    }
}

/// A single diagnostic message with its severity and source line.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Source line the diagnostic refers to (1-based).
    pub line: u32,
    /// Main diagnostic message.
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            line,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    /// Renders as `Line <n> Error: <message>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {} {}: {}", self.line, self.level, self.message)
    }
}

/// Handler collecting diagnostics for one compilation.
///
/// Interior mutability lets the lexer and parser report through a shared
/// `&Handler` while they hold other borrows; the front end is
/// single-threaded so a `RefCell` is all the synchronization needed.
///
/// # Example
///
/// ```
/// use opalc_util::{Diagnostic, Handler};
///
/// let handler = Handler::new();
/// handler.emit(Diagnostic::error(3, "Unrecognized pattern \"@\""));
///
/// assert!(handler.has_errors());
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Record an error at the given line.
    pub fn error(&self, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic::error(line, message));
    }

    /// Record a warning at the given line.
    pub fn warning(&self, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic::warning(line, message));
    }

    /// True if any error-level diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Snapshot of all diagnostics in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}
