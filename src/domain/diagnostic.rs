//! Structured, positioned diagnostics.
//!
//! A [`Diagnostic`] is assembled with a [`DiagnosticBuilder`] and is immutable
//! afterwards. A [`DiagnosticCollection`] is the ordered, append-only list
//! produced by one validation pass. It renders two projections:
//! - [`DiagnosticCollection::render_console`]: multi-line human output
//! - [`DiagnosticCollection::to_markers`]: editor markers (the only shape an
//!   editor binding depends on)

use crate::domain::error::{LexError, ParseError};
use crate::domain::span::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable diagnostic code: category letter plus three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Lexical
    IllegalCharacter,
    UnterminatedString,
    InvalidNumber,
    // Parse
    UnexpectedToken,
    MissingClosingParen,
    MissingExpression,
    NestingTooDeep,
    // Semantic
    ForbiddenKeyword,
    BuiltinReassignment,
    UnknownFunction,
    UndefinedVariable,
    WrongArgumentCount,
    TypeMismatch,
    UnusedExpression,
    // Runtime
    DivisionByZero,
    IndexOutOfRange,
    NullReference,
    LimitExceeded,
    InvalidArgument,
    InternalError,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::IllegalCharacter => "L001",
            DiagnosticCode::UnterminatedString => "L002",
            DiagnosticCode::InvalidNumber => "L003",
            DiagnosticCode::UnexpectedToken => "P001",
            DiagnosticCode::MissingClosingParen => "P002",
            DiagnosticCode::MissingExpression => "P003",
            DiagnosticCode::NestingTooDeep => "P004",
            DiagnosticCode::ForbiddenKeyword => "S001",
            DiagnosticCode::BuiltinReassignment => "S002",
            DiagnosticCode::UnknownFunction => "S003",
            DiagnosticCode::UndefinedVariable => "S004",
            DiagnosticCode::WrongArgumentCount => "S005",
            DiagnosticCode::TypeMismatch => "S006",
            DiagnosticCode::UnusedExpression => "S007",
            DiagnosticCode::DivisionByZero => "R001",
            DiagnosticCode::IndexOutOfRange => "R002",
            DiagnosticCode::NullReference => "R003",
            DiagnosticCode::LimitExceeded => "R004",
            DiagnosticCode::InvalidArgument => "R005",
            DiagnosticCode::InternalError => "R006",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Monaco `MarkerSeverity` numbering.
    pub fn marker_level(&self) -> u8 {
        match self {
            Severity::Error => 8,
            Severity::Warning => 4,
            Severity::Info => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInformation {
    pub range: SourceRange,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    code: DiagnosticCode,
    severity: Severity,
    message: String,
    range: SourceRange,
    hint: Option<String>,
    suggestion: Option<String>,
    related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn builder(code: DiagnosticCode, range: SourceRange) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, range)
    }

    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> SourceRange {
        self.range
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn related(&self) -> &[RelatedInformation] {
        &self.related
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Console rendering:
    ///
    /// ```text
    /// error[S003]: unknown function 'smaa'
    ///   --> 1:5
    ///   = hint: ...
    ///   = suggestion: ...
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}[{}]: {}\n  --> {}",
            self.severity, self.code, self.message, self.range.start
        );
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  = hint: {hint}"));
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str(&format!("\n  = suggestion: {suggestion}"));
        }
        for info in &self.related {
            out.push_str(&format!("\n  = note ({}): {}", info.range.start, info.message));
        }
        out
    }

    pub fn to_marker(&self) -> Marker {
        Marker {
            severity: self.severity.marker_level(),
            start_line_number: self.range.start.line,
            start_column: self.range.start.column,
            end_line_number: self.range.end.line,
            end_column: self.range.end.column,
            message: format!("[{}] {}", self.code, self.message),
            code: self.code.as_str().to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        Diagnostic::builder(err.code(), SourceRange::spanning(err.position, 1))
            .message(err.message.clone())
            .build()
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic::builder(err.code(), SourceRange::spanning(err.position, 1))
            .message(err.message.clone())
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    inner: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn new(code: DiagnosticCode, range: SourceRange) -> Self {
        Self {
            inner: Diagnostic {
                code,
                severity: Severity::Error,
                message: String::new(),
                range,
                hint: None,
                suggestion: None,
                related: Vec::new(),
            },
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.inner.severity = severity;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.inner.message = message.into();
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.inner.hint = Some(hint.into());
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.inner.suggestion = Some(suggestion.into());
        self
    }

    pub fn related(mut self, range: SourceRange, message: impl Into<String>) -> Self {
        self.inner.related.push(RelatedInformation {
            range,
            message: message.into(),
        });
        self
    }

    pub fn build(self) -> Diagnostic {
        self.inner
    }
}

/// Editor marker projection of a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub severity: u8,
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticCollection {
    items: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn render_console(&self) -> String {
        self.items
            .iter()
            .map(Diagnostic::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_markers(&self) -> Vec<Marker> {
        self.items.iter().map(Diagnostic::to_marker).collect()
    }
}

impl From<Diagnostic> for DiagnosticCollection {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            items: vec![diagnostic],
        }
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
