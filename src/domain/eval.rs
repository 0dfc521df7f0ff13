//! Shared IR evaluator.
//!
//! Both execution engines run programs through [`execute`]; they differ only
//! in the [`SideChannel`] they pass in. Statements run strictly in order,
//! single pass. Assignments write straight into the caller's [`Context`], so
//! a failing run leaves the bindings made by earlier statements in place.

use crate::domain::ast::BinaryOperator;
use crate::domain::builtins;
use crate::domain::context::Context;
use crate::domain::error::RuntimeError;
use crate::domain::indicator;
use crate::domain::ir::{IrNode, IrProgram};
use crate::domain::limits::{ExecutionGuard, RuntimeLimits};
use crate::domain::side_channel::{
    CloseSignal, Direction, EntrySignal, PlotRecord, PlotStyle, SideChannel, StrategyEvent,
    DEFAULT_BACKGROUND_COLOR, DEFAULT_PLOT_COLOR, DEFAULT_PLOT_TITLE, DEFAULT_SHAPE_COLOR,
    DEFAULT_SHAPE_TITLE,
};
use crate::domain::value::{truthy, Series, Value};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStats {
    pub operations: u64,
    pub elapsed: Duration,
}

/// Run `program` against `context`, reporting sink records to `channel`.
pub fn execute<S: SideChannel + ?Sized>(
    program: &IrProgram,
    context: &mut Context,
    channel: &mut S,
    limits: &RuntimeLimits,
) -> Result<ExecutionStats, RuntimeError> {
    let mut guard = ExecutionGuard::new(*limits);
    guard.check_input(context.len())?;

    let mut evaluator = Evaluator {
        len: context.len(),
        context,
        channel,
        guard: &mut guard,
    };
    for statement in &program.statements {
        evaluator.eval(statement)?;
        evaluator.guard.check_elapsed()?;
    }

    Ok(ExecutionStats {
        operations: guard.operations(),
        elapsed: guard.elapsed(),
    })
}

struct Evaluator<'a, S: SideChannel + ?Sized> {
    context: &'a mut Context,
    channel: &'a mut S,
    guard: &'a mut ExecutionGuard,
    len: usize,
}

impl<S: SideChannel + ?Sized> Evaluator<'_, S> {
    fn eval(&mut self, node: &IrNode) -> Result<Value, RuntimeError> {
        self.guard.tick()?;
        match node {
            IrNode::Const { value } => Ok(Value::from(value)),
            IrNode::Var { name } => {
                self.context
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
            }
            IrNode::Assign { name, value } => {
                let value = self.eval(value)?;
                self.context.set(name.clone(), value.clone());
                Ok(value)
            }
            IrNode::BinaryOp { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            IrNode::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&func.to_lowercase(), values)
            }
        }
    }

    fn call(&mut self, name: &str, values: Vec<Value>) -> Result<Value, RuntimeError> {
        let spec = builtins::lookup(name)
            .ok_or_else(|| RuntimeError::UnknownFunction { name: name.to_string() })?;
        if !spec.accepts(values.len()) {
            return Err(RuntimeError::invalid_argument(
                spec.name,
                format!("expects {} argument(s), got {}", spec.arity(), values.len()),
            ));
        }
        let args = Args {
            function: spec.name,
            values,
            len: self.len,
        };

        let value = match spec.name {
            "sma" => Value::Series(indicator::sma(&args.series(0)?, args.period(1)?)),
            "ema" => Value::Series(indicator::ema(&args.series(0)?, args.period(1)?)),
            "rsi" => Value::Series(indicator::rsi(&args.series(0)?, args.period(1)?)),
            "macd" | "macd_signal" | "macd_hist" => {
                let m = indicator::macd(
                    &args.series(0)?,
                    args.period(1)?,
                    args.period(2)?,
                    args.period(3)?,
                );
                Value::Series(match spec.name {
                    "macd" => m.line,
                    "macd_signal" => m.signal,
                    _ => m.histogram,
                })
            }
            "bb_upper" | "bb_lower" => {
                let bands = indicator::bollinger(&args.series(0)?, args.period(1)?, args.number(2)?);
                Value::Series(if spec.name == "bb_upper" {
                    bands.upper
                } else {
                    bands.lower
                })
            }
            "stoch_k" | "stoch_d" => {
                let s = indicator::stochastic(
                    &args.series(0)?,
                    &args.series(1)?,
                    &args.series(2)?,
                    args.period(3)?,
                    args.period(4)?,
                    args.period(5)?,
                );
                Value::Series(if spec.name == "stoch_k" { s.k } else { s.d })
            }
            "supertrend" => Value::Series(indicator::supertrend(
                &args.series(0)?,
                &args.series(1)?,
                &args.series(2)?,
                args.period(3)?,
                args.number(4)?,
            )),
            "vwap" => Value::Series(indicator::vwap(
                &args.series(0)?,
                &args.series(1)?,
                &args.series(2)?,
                &args.series(3)?,
            )),
            "cci" => Value::Series(indicator::cci(
                &args.series(0)?,
                &args.series(1)?,
                &args.series(2)?,
                args.period(3)?,
            )),
            "mfi" => Value::Series(indicator::mfi(
                &args.series(0)?,
                &args.series(1)?,
                &args.series(2)?,
                &args.series(3)?,
                args.period(4)?,
            )),
            "obv" => Value::Series(indicator::obv(&args.series(0)?, &args.series(1)?)),
            "crossover" => Value::BoolSeries(indicator::crossover(&args.series(0)?, &args.series(1)?)),
            "crossunder" => {
                Value::BoolSeries(indicator::crossunder(&args.series(0)?, &args.series(1)?))
            }
            "plot" => self.plot(args)?,
            "plotshape" | "bgcolor" => self.condition_sink(args)?,
            "strategy.entry" => self.entry(args)?,
            "strategy.close" => self.close(args)?,
            other => {
                return Err(RuntimeError::UnknownFunction {
                    name: other.to_string(),
                })
            }
        };
        Ok(value)
    }

    fn plot(&mut self, args: Args<'_>) -> Result<Value, RuntimeError> {
        let values = match &args.values[0] {
            Value::Series(s) => Value::Series(s.clone()),
            Value::BoolSeries(_) => Value::Series(args.series(0)?),
            other => {
                return Err(RuntimeError::invalid_argument(
                    args.function,
                    format!("first argument must be a series, got {}", other.type_name()),
                ))
            }
        };
        self.channel.plot(PlotRecord {
            title: args.text(1, DEFAULT_PLOT_TITLE)?,
            color: args.text(2, DEFAULT_PLOT_COLOR)?,
            style: PlotStyle::Line,
            values,
        });
        Ok(args.into_first())
    }

    fn condition_sink(&mut self, args: Args<'_>) -> Result<Value, RuntimeError> {
        if !args.values[0].is_series() {
            return Err(RuntimeError::invalid_argument(
                args.function,
                format!(
                    "first argument must be a series, got {}",
                    args.values[0].type_name()
                ),
            ));
        }
        let (title, color, style) = if args.function == "bgcolor" {
            (
                String::new(),
                args.text(1, DEFAULT_BACKGROUND_COLOR)?,
                PlotStyle::Background,
            )
        } else {
            (
                args.text(1, DEFAULT_SHAPE_TITLE)?,
                args.text(2, DEFAULT_SHAPE_COLOR)?,
                PlotStyle::Shape,
            )
        };
        self.channel.plot(PlotRecord {
            title,
            color,
            style,
            values: Value::BoolSeries(args.condition(0)?),
        });
        Ok(args.into_first())
    }

    fn entry(&mut self, args: Args<'_>) -> Result<Value, RuntimeError> {
        let id = args.required_text(0, "id")?;
        let direction_text = args.required_text(1, "direction")?;
        let direction = Direction::parse(&direction_text).ok_or_else(|| {
            RuntimeError::invalid_argument(
                args.function,
                format!("direction must be 'long' or 'short', got '{}'", direction_text),
            )
        })?;
        let condition = args.condition(2)?;
        self.channel.strategy_event(StrategyEvent::Entry(EntrySignal {
            id,
            direction,
            condition: condition.clone(),
            stop_loss_pct: args.optional_percent(3)?,
            take_profit_pct: args.optional_percent(4)?,
        }));
        Ok(Value::BoolSeries(condition))
    }

    fn close(&mut self, args: Args<'_>) -> Result<Value, RuntimeError> {
        let id = args.required_text(0, "id")?;
        let condition = args.condition(1)?;
        self.channel.strategy_event(StrategyEvent::Close(CloseSignal {
            id,
            condition: condition.clone(),
        }));
        Ok(Value::BoolSeries(condition))
    }
}

/// Evaluated call arguments plus the broadcast length for scalars.
struct Args<'a> {
    function: &'a str,
    values: Vec<Value>,
    len: usize,
}

impl Args<'_> {
    fn ordinal(index: usize) -> String {
        format!("argument {}", index + 1)
    }

    fn series(&self, index: usize) -> Result<Series, RuntimeError> {
        self.values[index].to_series(self.len).ok_or_else(|| {
            RuntimeError::invalid_argument(
                self.function,
                format!("{} must be a number or series, got string", Self::ordinal(index)),
            )
        })
    }

    fn condition(&self, index: usize) -> Result<Vec<bool>, RuntimeError> {
        self.values[index].to_bool_series(self.len).ok_or_else(|| {
            RuntimeError::invalid_argument(
                self.function,
                format!("{} must be a condition, got string", Self::ordinal(index)),
            )
        })
    }

    fn number(&self, index: usize) -> Result<f64, RuntimeError> {
        match self.values[index].as_number() {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(RuntimeError::invalid_argument(
                self.function,
                format!(
                    "{} must be a finite number, got {}",
                    Self::ordinal(index),
                    self.values[index].type_name()
                ),
            )),
        }
    }

    fn period(&self, index: usize) -> Result<usize, RuntimeError> {
        let n = self.number(index)?;
        if n < 1.0 || n.fract() != 0.0 {
            return Err(RuntimeError::invalid_argument(
                self.function,
                format!("period must be a positive integer, got {}", n),
            ));
        }
        Ok(n as usize)
    }

    fn optional_percent(&self, index: usize) -> Result<Option<f64>, RuntimeError> {
        if index >= self.values.len() {
            return Ok(None);
        }
        let n = self.number(index)?;
        if n <= 0.0 {
            return Err(RuntimeError::invalid_argument(
                self.function,
                format!("{} must be a positive percentage, got {}", Self::ordinal(index), n),
            ));
        }
        Ok(Some(n))
    }

    fn text(&self, index: usize, default: &str) -> Result<String, RuntimeError> {
        match self.values.get(index) {
            None => Ok(default.to_string()),
            Some(Value::Text(s)) => Ok(s.clone()),
            Some(other) => Err(RuntimeError::invalid_argument(
                self.function,
                format!("{} must be a string, got {}", Self::ordinal(index), other.type_name()),
            )),
        }
    }

    fn required_text(&self, index: usize, what: &str) -> Result<String, RuntimeError> {
        match &self.values[index] {
            Value::Text(s) => Ok(s.clone()),
            other => Err(RuntimeError::invalid_argument(
                self.function,
                format!("{} must be a string, got {}", what, other.type_name()),
            )),
        }
    }

    fn into_first(mut self) -> Value {
        self.values.swap_remove(0)
    }
}

/// Apply a binary operator. Two scalar-shaped operands use scalar semantics;
/// anything involving a series is broadcast position-wise.
pub fn binary(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return scalar_binary(op, a, b);
    }

    let series_len = left.series_len().max(right.series_len());
    match (left, right, series_len) {
        (Value::Text(a), Value::Text(b), _) => match op {
            BinaryOperator::Eq => Ok(Value::Bool(a == b)),
            BinaryOperator::Ne => Ok(Value::Bool(a != b)),
            _ => Err(type_mismatch(op, left, right)),
        },
        (_, _, None) => Err(type_mismatch(op, left, right)),
        (_, _, Some(len)) => Ok(series_binary(op, left, right, len)),
    }
}

fn type_mismatch(op: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        operator: op.symbol().to_string(),
        reason: format!("cannot combine {} and {}", left.type_name(), right.type_name()),
    }
}

fn scalar_binary(op: BinaryOperator, a: f64, b: f64) -> Result<Value, RuntimeError> {
    let value = match op {
        BinaryOperator::Add => Value::Scalar(a + b),
        BinaryOperator::Sub => Value::Scalar(a - b),
        BinaryOperator::Mul => Value::Scalar(a * b),
        BinaryOperator::Div => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Scalar(a / b)
        }
        BinaryOperator::Gt => Value::Bool(a > b),
        BinaryOperator::Lt => Value::Bool(a < b),
        BinaryOperator::Ge => Value::Bool(a >= b),
        BinaryOperator::Le => Value::Bool(a <= b),
        BinaryOperator::Eq => Value::Bool(a == b),
        BinaryOperator::Ne => Value::Bool(a != b),
        BinaryOperator::And => Value::Bool(truthy(Some(a)) && truthy(Some(b))),
        BinaryOperator::Or => Value::Bool(truthy(Some(a)) || truthy(Some(b))),
    };
    Ok(value)
}

fn series_binary(op: BinaryOperator, left: &Value, right: &Value, len: usize) -> Value {
    let (Some(a), Some(b)) = (left.to_series(len), right.to_series(len)) else {
        return Value::Series(vec![None; len]);
    };
    let at = |s: &Series, i: usize| s.get(i).copied().flatten();

    if op.is_comparison() || op.is_logical() {
        let values = (0..len)
            .map(|i| match (at(&a, i), at(&b, i)) {
                (Some(x), Some(y)) => match op {
                    BinaryOperator::Gt => x > y,
                    BinaryOperator::Lt => x < y,
                    BinaryOperator::Ge => x >= y,
                    BinaryOperator::Le => x <= y,
                    BinaryOperator::Eq => x == y,
                    BinaryOperator::Ne => x != y,
                    BinaryOperator::And => truthy(Some(x)) && truthy(Some(y)),
                    _ => truthy(Some(x)) || truthy(Some(y)),
                },
                _ => false,
            })
            .collect();
        return Value::BoolSeries(values);
    }

    let values = (0..len)
        .map(|i| {
            let (x, y) = (at(&a, i)?, at(&b, i)?);
            match op {
                BinaryOperator::Add => Some(x + y),
                BinaryOperator::Sub => Some(x - y),
                BinaryOperator::Mul => Some(x * y),
                _ => (y != 0.0).then(|| x / y),
            }
        })
        .collect();
    Value::Series(values)
}
