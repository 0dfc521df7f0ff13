//! Visualization engine: keeps plot records, drops strategy events.

use crate::domain::context::Context;
use crate::domain::engine::Engine;
use crate::domain::error::RuntimeError;
use crate::domain::eval::{execute, ExecutionStats};
use crate::domain::ir::IrProgram;
use crate::domain::limits::RuntimeLimits;
use crate::domain::side_channel::{PlotRecord, SideChannel, StrategyEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct VisualOutput {
    pub plots: Vec<PlotRecord>,
    pub stats: ExecutionStats,
}

#[derive(Debug, Default)]
struct PlotSink {
    plots: Vec<PlotRecord>,
}

impl SideChannel for PlotSink {
    fn plot(&mut self, record: PlotRecord) {
        self.plots.push(record);
    }

    fn strategy_event(&mut self, _event: StrategyEvent) {}
}

#[derive(Debug, Clone, Default)]
pub struct VisualEngine {
    limits: RuntimeLimits,
}

impl VisualEngine {
    pub fn new(limits: RuntimeLimits) -> Self {
        Self { limits }
    }
}

impl Engine for VisualEngine {
    type Output = VisualOutput;

    fn name(&self) -> &'static str {
        "visual"
    }

    fn run(&self, program: &IrProgram, context: &mut Context) -> Result<VisualOutput, RuntimeError> {
        tracing::debug!(statements = program.statements.len(), candles = context.len(), "visual engine start");
        let mut sink = PlotSink::default();
        let stats = execute(program, context, &mut sink, &self.limits)?;
        tracing::info!(
            operations = stats.operations,
            plots = sink.plots.len(),
            "visual engine finished"
        );
        Ok(VisualOutput {
            plots: sink.plots,
            stats,
        })
    }
}
