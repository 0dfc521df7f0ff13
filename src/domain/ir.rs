//! Intermediate representation.
//!
//! A simplified, self-describing tree. Every node serializes with a `kind`
//! tag so the document can cross engine and process boundaries unchanged:
//!
//! ```json
//! {"version":1,"statements":[{"kind":"Assign","name":"val","value":{"kind":"Const","value":10.0}}]}
//! ```

use crate::domain::ast::BinaryOperator;
use crate::domain::error::KuriError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const IR_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ConstValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConstValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Number(n) => write!(f, "{}", n),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IrNode {
    Assign {
        name: String,
        value: Box<IrNode>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<IrNode>,
        right: Box<IrNode>,
    },
    Call {
        func: String,
        args: Vec<IrNode>,
    },
    Var {
        name: String,
    },
    Const {
        value: ConstValue,
    },
}

impl IrNode {
    pub fn constant(value: ConstValue) -> Self {
        IrNode::Const { value }
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match self {
            IrNode::Const { value } => Some(value),
            _ => None,
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            IrNode::Assign { value, .. } => 1 + value.node_count(),
            IrNode::BinaryOp { left, right, .. } => 1 + left.node_count() + right.node_count(),
            IrNode::Call { args, .. } => 1 + args.iter().map(IrNode::node_count).sum::<usize>(),
            IrNode::Var { .. } | IrNode::Const { .. } => 1,
        }
    }
}

/// The compiled program document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrProgram {
    pub version: u32,
    pub statements: Vec<IrNode>,
}

impl IrProgram {
    pub fn new(statements: Vec<IrNode>) -> Self {
        Self {
            version: IR_VERSION,
            statements,
        }
    }

    pub fn to_json(&self) -> Result<String, KuriError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, KuriError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, KuriError> {
        let program: IrProgram = serde_json::from_str(json)?;
        if program.version != IR_VERSION {
            return Err(KuriError::Data {
                reason: format!(
                    "unsupported IR version {} (expected {})",
                    program.version, IR_VERSION
                ),
            });
        }
        Ok(program)
    }

    pub fn node_count(&self) -> usize {
        self.statements.iter().map(IrNode::node_count).sum()
    }
}
