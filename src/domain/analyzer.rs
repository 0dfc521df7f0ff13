//! Semantic analysis.
//!
//! One pass over the AST that accumulates every problem instead of stopping at
//! the first:
//! - forbidden identifiers (S001)
//! - assignment to a reserved series (S002)
//! - calls outside the builtin whitelist (S003)
//! - references to names never assigned (S004, warning)
//! - wrong argument counts (S005)
//! - discarded non-call expression statements (S007, warning)
//!
//! A program is valid iff no diagnostic has error severity.

use crate::domain::ast::{Node, Program};
use crate::domain::builtins::{self, is_reserved_series};
use crate::domain::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticCollection, Severity};
use crate::domain::forbidden;
use crate::domain::span::SourceRange;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub valid: bool,
    pub diagnostics: DiagnosticCollection,
}

struct Analyzer {
    diagnostics: DiagnosticCollection,
    /// Assigned names and where each was first assigned.
    defined: BTreeMap<String, SourceRange>,
}

/// Closest candidate within an edit distance of 2.
fn closest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|c| (strsim::levenshtein(name, c), c))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

impl Analyzer {
    fn new() -> Self {
        Self {
            diagnostics: DiagnosticCollection::new(),
            defined: BTreeMap::new(),
        }
    }

    /// Report `name` if forbidden; returns true when it was.
    fn check_forbidden(&mut self, name: &str, range: SourceRange) -> bool {
        match forbidden::classify(name) {
            Some(category) => {
                self.diagnostics.push(
                    Diagnostic::builder(DiagnosticCode::ForbiddenKeyword, range)
                        .message(category.message(name))
                        .hint(category.hint())
                        .build(),
                );
                true
            }
            None => false,
        }
    }

    fn visit_statement(&mut self, node: &Node) {
        match node {
            Node::Assignment { name, value, range } => {
                self.visit_expression(value);
                let name_range = SourceRange::spanning(range.start, name.chars().count());
                if self.check_forbidden(name, name_range) {
                    return;
                }
                if is_reserved_series(name) {
                    self.diagnostics.push(
                        Diagnostic::builder(DiagnosticCode::BuiltinReassignment, name_range)
                            .message(format!("cannot assign to built-in series '{}'", name))
                            .hint("open, high, low, close and volume are read-only")
                            .suggestion(format!("use a new name such as 'my_{}'", name))
                            .build(),
                    );
                    return;
                }
                self.defined.entry(name.clone()).or_insert(name_range);
            }
            Node::CallExpression { .. } => self.visit_expression(node),
            other => {
                self.visit_expression(other);
                self.diagnostics.push(
                    Diagnostic::builder(DiagnosticCode::UnusedExpression, other.range())
                        .severity(Severity::Warning)
                        .message("expression result is discarded")
                        .hint("assign it to a variable, e.g. 'value = ...'")
                        .build(),
                );
            }
        }
    }

    fn visit_expression(&mut self, node: &Node) {
        match node {
            Node::Literal { .. } => {}
            Node::Identifier { name, range } => self.visit_identifier(name, *range),
            Node::BinaryExpression { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            Node::CallExpression {
                callee,
                args,
                range,
            } => {
                self.visit_call(callee, args.len(), *range);
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            // Assignments only occur at statement level.
            Node::Assignment { .. } => self.visit_statement(node),
        }
    }

    fn visit_identifier(&mut self, name: &str, range: SourceRange) {
        if self.check_forbidden(name, range) {
            return;
        }
        if is_reserved_series(name) || self.defined.contains_key(name) {
            return;
        }
        let known = self
            .defined
            .keys()
            .map(String::as_str)
            .chain(builtins::RESERVED_SERIES);
        let mut builder = Diagnostic::builder(DiagnosticCode::UndefinedVariable, range)
            .severity(Severity::Warning)
            .message(format!("'{}' is not defined before this point", name))
            .hint("assign the variable earlier in the script or supply it in the context");
        if let Some(candidate) = closest(name, known) {
            builder = builder.suggestion(format!("did you mean '{}'?", candidate));
            if let Some(assigned) = self.defined.get(candidate) {
                builder = builder.related(*assigned, format!("'{}' is assigned here", candidate));
            }
        }
        self.diagnostics.push(builder.build());
    }

    fn visit_call(&mut self, callee: &str, arg_count: usize, range: SourceRange) {
        let callee_range = SourceRange::spanning(range.start, callee.chars().count());
        if self.check_forbidden(callee, callee_range) {
            return;
        }
        let lower = callee.to_lowercase();
        match builtins::lookup(&lower) {
            None => {
                let allowed: Vec<&str> = builtins::names().collect();
                let mut builder = Diagnostic::builder(DiagnosticCode::UnknownFunction, callee_range)
                    .message(format!("unknown function '{}'", callee))
                    .hint(format!("allowed functions: {}", allowed.join(", ")));
                if let Some(candidate) = closest(&lower, builtins::names()) {
                    builder = builder.suggestion(format!("did you mean '{}'?", candidate));
                }
                self.diagnostics.push(builder.build());
            }
            Some(spec) if !spec.accepts(arg_count) => {
                self.diagnostics.push(
                    Diagnostic::builder(DiagnosticCode::WrongArgumentCount, range)
                        .message(format!(
                            "{}() expects {} argument(s), got {}",
                            spec.name,
                            spec.arity(),
                            arg_count
                        ))
                        .hint(format!("signature: {}", spec))
                        .build(),
                );
            }
            Some(_) => {}
        }
    }
}

pub fn analyze(program: &Program) -> AnalysisResult {
    let mut analyzer = Analyzer::new();
    for statement in &program.body {
        analyzer.visit_statement(statement);
    }
    let diagnostics = analyzer.diagnostics;
    let valid = !diagnostics.has_errors();
    tracing::debug!(
        valid,
        diagnostics = diagnostics.len(),
        "semantic analysis finished"
    );
    AnalysisResult { valid, diagnostics }
}
