//! Runtime values.
//!
//! Every value is one of a small set of shapes and every operator or builtin
//! matches on the shape explicitly. `None` in a series marks an absent value
//! (warmup period, division by zero, missing input).

use crate::domain::ir::ConstValue;
use serde::Serialize;

pub type Series = Vec<Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Bool(bool),
    Series(Series),
    BoolSeries(Vec<bool>),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "number",
            Value::Bool(_) => "bool",
            Value::Series(_) => "series",
            Value::BoolSeries(_) => "bool series",
            Value::Text(_) => "string",
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(self, Value::Series(_) | Value::BoolSeries(_))
    }

    /// Length of a series value.
    pub fn series_len(&self) -> Option<usize> {
        match self {
            Value::Series(s) => Some(s.len()),
            Value::BoolSeries(s) => Some(s.len()),
            _ => None,
        }
    }

    /// Numeric view of a scalar-shaped value; booleans read as 1/0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Scalar(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric series view; scalars are broadcast to `len`.
    pub fn to_series(&self, len: usize) -> Option<Series> {
        match self {
            Value::Series(s) => Some(s.clone()),
            Value::BoolSeries(s) => Some(
                s.iter()
                    .map(|b| Some(if *b { 1.0 } else { 0.0 }))
                    .collect(),
            ),
            Value::Scalar(_) | Value::Bool(_) => Some(vec![self.as_number(); len]),
            Value::Text(_) => None,
        }
    }

    /// Boolean series view: a present, non-zero number is true.
    pub fn to_bool_series(&self, len: usize) -> Option<Vec<bool>> {
        match self {
            Value::BoolSeries(s) => Some(s.clone()),
            Value::Series(s) => Some(s.iter().map(|v| truthy(*v)).collect()),
            Value::Scalar(_) | Value::Bool(_) => Some(vec![truthy(self.as_number()); len]),
            Value::Text(_) => None,
        }
    }
}

pub fn truthy(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0 && !v.is_nan())
}

impl From<ConstValue> for Value {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Number(n) => Value::Scalar(n),
            ConstValue::Bool(b) => Value::Bool(b),
            ConstValue::Text(s) => Value::Text(s),
        }
    }
}

impl From<&ConstValue> for Value {
    fn from(value: &ConstValue) -> Self {
        Value::from(value.clone())
    }
}
