//! AST to IR lowering with constant folding and propagation.
//!
//! Propagation is a single forward pass over one table of names known to hold
//! a constant: a later use sees the most recent constant assigned to the name,
//! in statement order. There is no fixpoint iteration. Reassigning a name to a
//! non-constant value drops it from the table.
//!
//! Folding applies to `+ - * / > < >= <= == !=` when both operands are numeric
//! constants. Division by a constant zero is left for the engine to report,
//! as is any fold that would produce a non-finite number. Calls are never
//! folded; their names are lower-cased for dispatch.

use crate::domain::ast::{BinaryOperator, Literal, Node, Program};
use crate::domain::ir::{ConstValue, IrNode, IrProgram};
use std::collections::HashMap;

struct Compiler {
    optimize: bool,
    constants: HashMap<String, ConstValue>,
    folded: usize,
}

/// Evaluate a binary operator over two numbers, or `None` if it must not fold.
pub fn fold_numbers(op: BinaryOperator, a: f64, b: f64) -> Option<ConstValue> {
    let value = match op {
        BinaryOperator::Add => ConstValue::Number(a + b),
        BinaryOperator::Sub => ConstValue::Number(a - b),
        BinaryOperator::Mul => ConstValue::Number(a * b),
        BinaryOperator::Div => {
            if b == 0.0 {
                return None;
            }
            ConstValue::Number(a / b)
        }
        BinaryOperator::Gt => ConstValue::Bool(a > b),
        BinaryOperator::Lt => ConstValue::Bool(a < b),
        BinaryOperator::Ge => ConstValue::Bool(a >= b),
        BinaryOperator::Le => ConstValue::Bool(a <= b),
        BinaryOperator::Eq => ConstValue::Bool(a == b),
        BinaryOperator::Ne => ConstValue::Bool(a != b),
        BinaryOperator::And | BinaryOperator::Or => return None,
    };
    match value {
        ConstValue::Number(n) if !n.is_finite() => None,
        other => Some(other),
    }
}

impl Compiler {
    fn new(optimize: bool) -> Self {
        Self {
            optimize,
            constants: HashMap::new(),
            folded: 0,
        }
    }

    fn compile_node(&mut self, node: &Node) -> IrNode {
        match node {
            Node::Literal { value, .. } => IrNode::constant(match value {
                Literal::Number(n) => ConstValue::Number(*n),
                Literal::String(s) => ConstValue::Text(s.clone()),
            }),
            Node::Identifier { name, .. } => match self.constants.get(name) {
                Some(value) if self.optimize => IrNode::constant(value.clone()),
                _ => IrNode::Var { name: name.clone() },
            },
            Node::Assignment { name, value, .. } => {
                let value = self.compile_node(value);
                match value.as_const() {
                    Some(c) if self.optimize => {
                        self.constants.insert(name.clone(), c.clone());
                    }
                    _ => {
                        self.constants.remove(name);
                    }
                }
                IrNode::Assign {
                    name: name.clone(),
                    value: Box::new(value),
                }
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => {
                let left = self.compile_node(left);
                let right = self.compile_node(right);
                if self.optimize {
                    let numbers = (
                        left.as_const().and_then(ConstValue::as_number),
                        right.as_const().and_then(ConstValue::as_number),
                    );
                    if let (Some(a), Some(b)) = numbers {
                        if let Some(value) = fold_numbers(*operator, a, b) {
                            self.folded += 1;
                            return IrNode::constant(value);
                        }
                    }
                }
                IrNode::BinaryOp {
                    op: *operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            Node::CallExpression { callee, args, .. } => IrNode::Call {
                func: callee.to_lowercase(),
                args: args.iter().map(|a| self.compile_node(a)).collect(),
            },
        }
    }

    fn compile_program(&mut self, program: &Program) -> IrProgram {
        let statements = program
            .body
            .iter()
            .map(|s| self.compile_node(s))
            .collect();
        IrProgram::new(statements)
    }
}

/// Lower a semantically valid program. Total: never fails.
pub fn compile(program: &Program) -> IrProgram {
    let mut compiler = Compiler::new(true);
    let ir = compiler.compile_program(program);
    tracing::debug!(
        statements = ir.statements.len(),
        folded = compiler.folded,
        propagated = compiler.constants.len(),
        "compiled IR"
    );
    ir
}

/// Lower without folding or propagation.
pub fn compile_unoptimized(program: &Program) -> IrProgram {
    Compiler::new(false).compile_program(program)
}
