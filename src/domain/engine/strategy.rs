//! Strategy engine: keeps entry/close events, drops plot records.

use crate::domain::context::Context;
use crate::domain::engine::Engine;
use crate::domain::error::RuntimeError;
use crate::domain::eval::{execute, ExecutionStats};
use crate::domain::ir::IrProgram;
use crate::domain::limits::RuntimeLimits;
use crate::domain::side_channel::{PlotRecord, SideChannel, StrategyEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub events: Vec<StrategyEvent>,
    pub stats: ExecutionStats,
}

#[derive(Debug, Default)]
struct SignalSink {
    events: Vec<StrategyEvent>,
}

impl SideChannel for SignalSink {
    fn plot(&mut self, _record: PlotRecord) {}

    fn strategy_event(&mut self, event: StrategyEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    limits: RuntimeLimits,
}

impl StrategyEngine {
    pub fn new(limits: RuntimeLimits) -> Self {
        Self { limits }
    }
}

impl Engine for StrategyEngine {
    type Output = StrategyOutput;

    fn name(&self) -> &'static str {
        "strategy"
    }

    fn run(&self, program: &IrProgram, context: &mut Context) -> Result<StrategyOutput, RuntimeError> {
        tracing::debug!(statements = program.statements.len(), candles = context.len(), "strategy engine start");
        let mut sink = SignalSink::default();
        let stats = execute(program, context, &mut sink, &self.limits)?;
        tracing::info!(
            operations = stats.operations,
            events = sink.events.len(),
            "strategy engine finished"
        );
        Ok(StrategyOutput {
            events: sink.events,
            stats,
        })
    }
}
