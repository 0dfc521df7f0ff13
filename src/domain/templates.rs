//! Curated Kuri strategy templates.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub source: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "ma-crossover",
        name: "MA Crossover",
        description: "EMA 9/21 crossover: long on cross up, short on cross down",
        tags: &["ema", "trend", "crossover"],
        source: r##"// EMA 9/21 crossover
fast = ema(close, 9)
slow = ema(close, 21)
plot(fast, "EMA 9", "#2962FF")
plot(slow, "EMA 21", "#FF6D00")
strategy.entry("ma-long", "long", crossover(fast, slow))
strategy.entry("ma-short", "short", crossunder(fast, slow))
"##,
    },
    Template {
        id: "rsi-reversal",
        name: "RSI Reversal",
        description: "RSI 14: long below 30, short above 70",
        tags: &["rsi", "momentum", "mean-reversion"],
        source: r##"// RSI 14 oversold / overbought
length = 14
strength = rsi(close, length)
plot(strength, "RSI 14", "#7E57C2")
oversold = strength < 30
overbought = strength > 70
plotshape(oversold, "Oversold", "#26A69A")
strategy.entry("rsi-long", "long", oversold)
strategy.entry("rsi-short", "short", overbought)
"##,
    },
    Template {
        id: "momentum-breakout",
        name: "Momentum Breakout",
        description: "Close crossing the Bollinger 20/2 bands",
        tags: &["bollinger", "breakout", "volatility"],
        source: r##"// Bollinger 20/2 breakout
upper = bb_upper(close, 20, 2)
lower = bb_lower(close, 20, 2)
plot(upper, "Upper", "#EF5350")
plot(lower, "Lower", "#26A69A")
strategy.entry("bb-long", "long", crossover(close, upper))
strategy.entry("bb-short", "short", crossunder(close, lower))
"##,
    },
];

pub fn all() -> &'static [Template] {
    TEMPLATES
}

/// Case-insensitive lookup by id.
pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}
