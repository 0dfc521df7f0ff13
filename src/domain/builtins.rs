//! Built-in function catalog.
//!
//! This table is the public contract shared by the analyzer (whitelist and
//! signatures) and the shared evaluator (dispatch). Adding a function means
//! adding it here and to [`crate::domain::eval`].

use std::fmt;

/// Series every context is seeded with; scripts may not assign them.
pub const RESERVED_SERIES: [&str; 5] = ["open", "high", "low", "close", "volume"];

pub fn is_reserved_series(name: &str) -> bool {
    RESERVED_SERIES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Indicator,
    Visual,
    Strategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSpec {
    pub name: &'static str,
    pub params: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub kind: BuiltinKind,
}

impl BuiltinSpec {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && count <= self.max_args
    }

    /// "2" or "3 to 5".
    pub fn arity(&self) -> String {
        if self.min_args == self.max_args {
            self.min_args.to_string()
        } else {
            format!("{} to {}", self.min_args, self.max_args)
        }
    }
}

impl fmt::Display for BuiltinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params)
    }
}

const fn spec(
    name: &'static str,
    params: &'static str,
    min_args: usize,
    max_args: usize,
    kind: BuiltinKind,
) -> BuiltinSpec {
    BuiltinSpec {
        name,
        params,
        min_args,
        max_args,
        kind,
    }
}

pub const BUILTINS: &[BuiltinSpec] = &[
    spec("sma", "source, period", 2, 2, BuiltinKind::Indicator),
    spec("ema", "source, period", 2, 2, BuiltinKind::Indicator),
    spec("rsi", "source, period", 2, 2, BuiltinKind::Indicator),
    spec("macd", "source, fast, slow, signal", 4, 4, BuiltinKind::Indicator),
    spec("macd_signal", "source, fast, slow, signal", 4, 4, BuiltinKind::Indicator),
    spec("macd_hist", "source, fast, slow, signal", 4, 4, BuiltinKind::Indicator),
    spec("bb_upper", "source, period, mult", 3, 3, BuiltinKind::Indicator),
    spec("bb_lower", "source, period, mult", 3, 3, BuiltinKind::Indicator),
    spec(
        "stoch_k",
        "high, low, close, k_period, d_period, slowing",
        6,
        6,
        BuiltinKind::Indicator,
    ),
    spec(
        "stoch_d",
        "high, low, close, k_period, d_period, slowing",
        6,
        6,
        BuiltinKind::Indicator,
    ),
    spec(
        "supertrend",
        "high, low, close, period, multiplier",
        5,
        5,
        BuiltinKind::Indicator,
    ),
    spec("vwap", "high, low, close, volume", 4, 4, BuiltinKind::Indicator),
    spec("cci", "high, low, close, period", 4, 4, BuiltinKind::Indicator),
    spec("mfi", "high, low, close, volume, period", 5, 5, BuiltinKind::Indicator),
    spec("obv", "close, volume", 2, 2, BuiltinKind::Indicator),
    spec("crossover", "a, b", 2, 2, BuiltinKind::Indicator),
    spec("crossunder", "a, b", 2, 2, BuiltinKind::Indicator),
    spec("plot", "series, title?, color?", 1, 3, BuiltinKind::Visual),
    spec("plotshape", "condition, title?, color?", 1, 3, BuiltinKind::Visual),
    spec("bgcolor", "condition, color?", 1, 2, BuiltinKind::Visual),
    spec(
        "strategy.entry",
        "id, direction, condition, stop_loss_pct?, take_profit_pct?",
        3,
        5,
        BuiltinKind::Strategy,
    ),
    spec("strategy.close", "id, condition", 2, 2, BuiltinKind::Strategy),
];

/// Case-insensitive lookup.
pub fn lookup(name: &str) -> Option<&'static BuiltinSpec> {
    let lower = name.to_lowercase();
    BUILTINS.iter().find(|b| b.name == lower)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}
