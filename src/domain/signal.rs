//! Latest-bar trade signals with risk levels.

use crate::domain::side_channel::{Direction, StrategyEvent};
use serde::Serialize;

/// Percentages applied when an entry does not carry its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskDefaults {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskDefaults {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Long: stop below, target above. Short: mirrored.
pub fn risk_levels(price: f64, direction: Direction, stop_loss_pct: f64, take_profit_pct: f64) -> RiskLevels {
    let risk = stop_loss_pct / 100.0;
    let reward = take_profit_pct / 100.0;
    match direction {
        Direction::Long => RiskLevels {
            stop_loss: price * (1.0 - risk),
            take_profit: price * (1.0 + reward),
        },
        Direction::Short => RiskLevels {
            stop_loss: price * (1.0 + risk),
            take_profit: price * (1.0 - reward),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Entry,
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub id: String,
    pub action: SignalAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub price: f64,
    #[serde(flatten)]
    pub risk: Option<RiskLevels>,
}

/// Events whose condition holds on the most recent candle, in event order.
pub fn latest_signals(events: &[StrategyEvent], close: &[Option<f64>], defaults: &RiskDefaults) -> Vec<Signal> {
    let Some(last) = close.len().checked_sub(1) else {
        return Vec::new();
    };
    let Some(price) = close[last] else {
        return Vec::new();
    };

    events
        .iter()
        .filter(|event| event.condition().get(last).copied().unwrap_or(false))
        .map(|event| match event {
            StrategyEvent::Entry(entry) => Signal {
                id: entry.id.clone(),
                action: SignalAction::Entry,
                direction: Some(entry.direction),
                price,
                risk: Some(risk_levels(
                    price,
                    entry.direction,
                    entry.stop_loss_pct.unwrap_or(defaults.stop_loss_pct),
                    entry.take_profit_pct.unwrap_or(defaults.take_profit_pct),
                )),
            },
            StrategyEvent::Close(exit) => Signal {
                id: exit.id.clone(),
                action: SignalAction::Close,
                direction: None,
                price,
                risk: None,
            },
        })
        .collect()
}
