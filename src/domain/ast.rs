//! Abstract syntax tree for Kuri scripts.

use crate::domain::span::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lt => "<",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Le => "<=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    /// Binding power, low to high: or < and < comparison < additive < multiplicative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Gt
            | BinaryOperator::Lt
            | BinaryOperator::Ge
            | BinaryOperator::Le => 3,
            BinaryOperator::Add | BinaryOperator::Sub => 4,
            BinaryOperator::Mul | BinaryOperator::Div => 5,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == 3
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Assignment {
        name: String,
        value: Box<Node>,
        range: SourceRange,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
        range: SourceRange,
    },
    CallExpression {
        callee: String,
        args: Vec<Node>,
        range: SourceRange,
    },
    Identifier {
        name: String,
        range: SourceRange,
    },
    Literal {
        value: Literal,
        range: SourceRange,
    },
}

impl Node {
    pub fn range(&self) -> SourceRange {
        match self {
            Node::Assignment { range, .. }
            | Node::BinaryExpression { range, .. }
            | Node::CallExpression { range, .. }
            | Node::Identifier { range, .. }
            | Node::Literal { range, .. } => *range,
        }
    }
}

/// Root of the tree; statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Node>,
}
