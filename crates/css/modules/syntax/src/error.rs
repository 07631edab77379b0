//! Parse errors and the diagnostics side channel.
//!
//! Value parsers return `Result` and never build partial values. Messages that should not abort
//! parsing (deprecations) travel through [`ParserContext`] instead.

use core::cell::RefCell;
use core::fmt;

use cssparser::{BasicParseErrorKind, ParseErrorKind, SourceLocation};
use log::{debug, warn};

/// Custom error payload carried by `cssparser::ParseError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleParseErrorKind {
    /// A grammar production rejected its input; the message says what was expected.
    Invalid(String),
}

impl fmt::Display for StyleParseErrorKind {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(message) => formatter.write_str(message),
        }
    }
}

/// Parse error produced by every value parser in the engine.
pub type ParseError<'input> = cssparser::ParseError<'input, StyleParseErrorKind>;

/// Result alias for value parsers.
pub type ParseResult<'input, T> = Result<T, ParseError<'input>>;

/// Render any parse error as a human readable message.
pub fn describe_error(error: &ParseError<'_>) -> String {
    match &error.kind {
        ParseErrorKind::Custom(kind) => kind.to_string(),
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "Unexpected end of input".to_owned()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("Unexpected token {token:?}")
        }
        ParseErrorKind::Basic(other) => format!("{other:?}"),
    }
}

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Accepted input using a deprecated form.
    Deprecated,
    /// Rejected input; the declaration or rule it belongs to was dropped.
    Error,
}

/// One message reported while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Human readable message.
    pub message: String,
    /// Zero-based line of the offending input.
    pub line: u32,
    /// One-based column of the offending input.
    pub column: u32,
}

impl Diagnostic {
    /// Build a diagnostic from a parse error.
    pub fn from_error(error: &ParseError<'_>) -> Self {
        Self {
            severity: Severity::Error,
            message: describe_error(error),
            line: error.location.line,
            column: error.location.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Deprecated => "deprecated",
            Severity::Error => "error",
        };
        write!(
            formatter,
            "{}:{}: {label}: {}",
            self.line.saturating_add(1),
            self.column,
            self.message
        )
    }
}

/// Per-parse state shared by every production: currently the diagnostics sink.
#[derive(Debug, Default)]
pub struct ParserContext {
    /// Messages collected so far, in report order.
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl ParserContext {
    /// Create an empty context.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal deprecation at `location`.
    pub fn deprecated(&self, location: SourceLocation, message: impl Into<String>) {
        let message = message.into();
        debug!("deprecated CSS at {}:{}: {message}", location.line, location.column);
        self.diagnostics.borrow_mut().push(Diagnostic {
            severity: Severity::Deprecated,
            message,
            line: location.line,
            column: location.column,
        });
    }

    /// Record a parse error that caused input to be dropped.
    pub fn report_error(&self, error: &ParseError<'_>) {
        let diagnostic = Diagnostic::from_error(error);
        warn!("dropping invalid CSS: {diagnostic}");
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Record an already-built diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Whether any diagnostic of `severity` has been reported.
    pub fn has(&self, severity: Severity) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|diagnostic| diagnostic.severity == severity)
    }

    /// Drain every collected diagnostic.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}
