//! Core domain: the Kuri pipeline and its execution engines.
//!
//! source → [`lexer`] → [`parser`] → [`analyzer`] → [`compiler`] → [`ir`]
//! → [`engine`] (through the shared [`eval`] and [`indicator`] library).

pub mod analyzer;
pub mod ast;
pub mod builtins;
pub mod compiler;
pub mod config_validation;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod eval;
pub mod forbidden;
pub mod indicator;
pub mod ir;
pub mod lexer;
pub mod limits;
pub mod ohlcv;
pub mod parser;
pub mod pipeline;
pub mod side_channel;
pub mod signal;
pub mod span;
pub mod templates;
pub mod token;
pub mod value;
