//! Records produced by sink builtins, and the capability interface the
//! shared evaluator reports them through.

use crate::domain::value::Value;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_PLOT_TITLE: &str = "Plot";
pub const DEFAULT_PLOT_COLOR: &str = "#2962FF";
pub const DEFAULT_SHAPE_TITLE: &str = "Shape";
pub const DEFAULT_SHAPE_COLOR: &str = "#26A69A";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFEB3B";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    Line,
    Shape,
    Background,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRecord {
    pub title: String,
    pub color: String,
    pub style: PlotStyle,
    pub values: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// `long`/`buy` or `short`/`sell`, case-insensitive.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySignal {
    pub id: String,
    pub direction: Direction,
    pub condition: Vec<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseSignal {
    pub id: String,
    pub condition: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StrategyEvent {
    Entry(EntrySignal),
    Close(CloseSignal),
}

impl StrategyEvent {
    pub fn id(&self) -> &str {
        match self {
            StrategyEvent::Entry(e) => &e.id,
            StrategyEvent::Close(c) => &c.id,
        }
    }

    pub fn condition(&self) -> &[bool] {
        match self {
            StrategyEvent::Entry(e) => &e.condition,
            StrategyEvent::Close(c) => &c.condition,
        }
    }
}

/// Where sink builtins deliver their records. An engine keeps the records it
/// cares about and drops the rest.
pub trait SideChannel {
    fn plot(&mut self, record: PlotRecord);
    fn strategy_event(&mut self, event: StrategyEvent);
}

/// Keeps every record.
#[cfg(test)]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Recorder {
    pub plots: Vec<PlotRecord>,
    pub events: Vec<StrategyEvent>,
}

#[cfg(test)]
impl SideChannel for Recorder {
    fn plot(&mut self, record: PlotRecord) {
        self.plots.push(record);
    }

    fn strategy_event(&mut self, event: StrategyEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_aliases() {
        assert_eq!(Direction::parse("BUY"), Some(Direction::Long));
        assert_eq!(Direction::parse("long"), Some(Direction::Long));
        assert_eq!(Direction::parse("Sell"), Some(Direction::Short));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = StrategyEvent::Close(CloseSignal {
            id: "L".into(),
            condition: vec![false, true],
        });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"close","id":"L","condition":[false,true]}"#);
        assert_eq!(event.id(), "L");
    }
}
