//! Source-to-IR facade over the lexer, parser, analyzer and compiler.
//!
//! Lexical and parse failures stop the pipeline at once. Semantic problems
//! are accumulated and only error-severity diagnostics block compilation.

use crate::domain::analyzer::analyze;
use crate::domain::ast::Program;
use crate::domain::compiler;
use crate::domain::context::Context;
use crate::domain::diagnostic::{Diagnostic, DiagnosticCollection};
use crate::domain::engine::Engine;
use crate::domain::error::KuriError;
use crate::domain::ir::IrProgram;
use crate::domain::lexer::tokenize;
use crate::domain::parser::parse;

/// A compiled program plus the non-blocking diagnostics found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub program: IrProgram,
    pub diagnostics: DiagnosticCollection,
}

/// Lex and parse.
pub fn parse_source(source: &str) -> Result<Program, KuriError> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}

/// Every diagnostic for `source`. A lexical or parse failure yields exactly
/// one diagnostic.
pub fn check(source: &str) -> DiagnosticCollection {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => return Diagnostic::from(&err).into(),
    };
    match parse(&tokens) {
        Ok(program) => analyze(&program).diagnostics,
        Err(err) => Diagnostic::from(&err).into(),
    }
}

fn compile_with(source: &str, optimize: bool) -> Result<Compilation, KuriError> {
    let program = parse_source(source)?;
    let analysis = analyze(&program);
    if analysis.diagnostics.has_errors() {
        tracing::info!(
            errors = analysis.diagnostics.error_count(),
            "compilation blocked by semantic errors"
        );
        return Err(KuriError::Semantic(analysis.diagnostics));
    }
    for warning in analysis.diagnostics.warnings() {
        tracing::warn!(
            code = %warning.code(),
            at = %warning.range().start,
            "{}",
            warning.message()
        );
    }

    let program = if optimize {
        compiler::compile(&program)
    } else {
        compiler::compile_unoptimized(&program)
    };
    Ok(Compilation {
        program,
        diagnostics: analysis.diagnostics,
    })
}

/// lex → parse → analyze → compile with folding and propagation.
pub fn compile(source: &str) -> Result<Compilation, KuriError> {
    compile_with(source, true)
}

/// Same as [`compile`] with folding and propagation disabled.
pub fn compile_unoptimized(source: &str) -> Result<Compilation, KuriError> {
    compile_with(source, false)
}

/// Compile `source` and execute it on `engine`.
pub fn run<E: Engine>(engine: &E, source: &str, context: &mut Context) -> Result<E::Output, KuriError> {
    let compilation = compile(source)?;
    tracing::debug!(engine = engine.name(), "running compiled program");
    Ok(engine.run(&compilation.program, context)?)
}
