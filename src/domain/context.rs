//! Execution context: the name to value namespace of one run.

use crate::domain::builtins::{is_reserved_series, RESERVED_SERIES};
use crate::domain::error::RuntimeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::value::{Series, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Seeded with `open`, `high`, `low`, `close`, `volume` (oldest candle first);
/// assignments add or overwrite bindings in the same namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    bindings: BTreeMap<String, Value>,
}

fn to_series(values: Vec<f64>) -> Value {
    Value::Series(values.into_iter().map(Some).collect())
}

impl Context {
    /// Build a context from the five reserved series, which must share one length.
    pub fn new(
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self, RuntimeError> {
        let expected = close.len();
        let columns = [open, high, low, close, volume];
        let mut bindings = BTreeMap::new();
        for (name, values) in RESERVED_SERIES.into_iter().zip(columns) {
            if values.len() != expected {
                return Err(RuntimeError::InvalidContext {
                    name: name.to_string(),
                    expected,
                    actual: values.len(),
                });
            }
            bindings.insert(name.to_string(), to_series(values));
        }
        Ok(Self { bindings })
    }

    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        let column = |f: fn(&OhlcvBar) -> f64| to_series(bars.iter().map(f).collect());
        let mut bindings = BTreeMap::new();
        bindings.insert("open".to_string(), column(|b| b.open));
        bindings.insert("high".to_string(), column(|b| b.high));
        bindings.insert("low".to_string(), column(|b| b.low));
        bindings.insert("close".to_string(), column(|b| b.close));
        bindings.insert("volume".to_string(), column(|b| b.volume));
        Self { bindings }
    }

    /// Number of candles (length of the primary `close` series).
    pub fn len(&self) -> usize {
        self.bindings
            .get("close")
            .and_then(Value::series_len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Bind `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        match self.bindings.get(name) {
            Some(Value::Series(s)) => Some(s),
            _ => None,
        }
    }

    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }

    /// Bindings other than the reserved series.
    pub fn user_bindings(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings
            .iter()
            .filter(|(name, _)| !is_reserved_series(name))
    }
}
