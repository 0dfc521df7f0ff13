//! Error types for every pipeline stage.

use crate::domain::diagnostic::{DiagnosticCode, DiagnosticCollection};
use crate::domain::span::Position;
use std::fmt;

/// Render `err` under the offending source line with a caret at `position`.
fn caret_context(input: &str, position: Position, err: &dyn fmt::Display) -> String {
    let line = input.lines().nth(position.line.saturating_sub(1)).unwrap_or("");
    let caret = " ".repeat(position.column.saturating_sub(1)) + "^";
    format!("{line}\n{caret}\n{err}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    IllegalCharacter,
    UnterminatedString,
    InvalidNumber,
}

/// A lexical error; aborts the pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("lexical error at {position}: {message}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    pub position: Position,
}

impl LexError {
    pub fn display_with_context(&self, input: &str) -> String {
        caret_context(input, self.position, self)
    }

    pub fn code(&self) -> DiagnosticCode {
        match self.kind {
            LexErrorKind::IllegalCharacter => DiagnosticCode::IllegalCharacter,
            LexErrorKind::UnterminatedString => DiagnosticCode::UnterminatedString,
            LexErrorKind::InvalidNumber => DiagnosticCode::InvalidNumber,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    MissingClosingParen,
    MissingExpression,
    NestingTooDeep,
}

/// A parse error with position information; aborts the pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at {position}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        caret_context(input, self.position, self)
    }

    pub fn code(&self) -> DiagnosticCode {
        match self.kind {
            ParseErrorKind::UnexpectedToken => DiagnosticCode::UnexpectedToken,
            ParseErrorKind::MissingClosingParen => DiagnosticCode::MissingClosingParen,
            ParseErrorKind::MissingExpression => DiagnosticCode::MissingExpression,
            ParseErrorKind::NestingTooDeep => DiagnosticCode::NestingTooDeep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    SeriesLength,
    Operations,
    ExecutionTime,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::SeriesLength => write!(f, "series length"),
            LimitKind::Operations => write!(f, "operation count"),
            LimitKind::ExecutionTime => write!(f, "execution time (ms)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitViolation {
    pub kind: LimitKind,
    pub limit: u64,
    pub observed: u64,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} limit exceeded: {} > {}",
            self.kind, self.observed, self.limit
        )
    }
}

/// Terminal failure of a single engine run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("internal error: unknown function '{name}' reached the engine")]
    UnknownFunction { name: String },

    #[error("{function}(): {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("type mismatch in '{operator}': {reason}")]
    TypeMismatch { operator: String, reason: String },

    #[error("invalid context: series '{name}' has {actual} values, expected {expected}")]
    InvalidContext {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("sandbox violation: {0}")]
    LimitExceeded(LimitViolation),
}

impl RuntimeError {
    /// True for the sandbox guard failures, false for program errors.
    pub fn is_sandbox_violation(&self) -> bool {
        matches!(self, RuntimeError::LimitExceeded(_))
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            RuntimeError::UndefinedVariable { .. } => DiagnosticCode::NullReference,
            RuntimeError::UnknownFunction { .. } => DiagnosticCode::InternalError,
            RuntimeError::InvalidArgument { .. } => DiagnosticCode::InvalidArgument,
            RuntimeError::DivisionByZero => DiagnosticCode::DivisionByZero,
            RuntimeError::TypeMismatch { .. } => DiagnosticCode::InvalidArgument,
            RuntimeError::InvalidContext { .. } => DiagnosticCode::IndexOutOfRange,
            RuntimeError::LimitExceeded(_) => DiagnosticCode::LimitExceeded,
        }
    }

    pub(crate) fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        RuntimeError::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for kuri.
#[derive(Debug, thiserror::Error)]
pub enum KuriError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("semantic analysis failed with {} error(s)", .0.error_count())]
    Semantic(DiagnosticCollection),

    #[error("runtime error [{code}]: {0}", code = .0.code())]
    Runtime(#[from] RuntimeError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KuriError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            KuriError::Io(_) => 1,
            KuriError::ConfigParse { .. } | KuriError::ConfigInvalid { .. } => 2,
            KuriError::Data { .. } | KuriError::Json(_) => 3,
            KuriError::Lex(_) | KuriError::Parse(_) | KuriError::Semantic(_) => 4,
            KuriError::Runtime(e) if e.is_sandbox_violation() => 6,
            KuriError::Runtime(_) => 5,
        }
    }
}

impl From<&KuriError> for std::process::ExitCode {
    fn from(err: &KuriError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
