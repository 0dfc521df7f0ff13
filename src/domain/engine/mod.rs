//! Execution engines.
//!
//! Two engines share one evaluator and one indicator library. The visual
//! engine collects plot records for charting; the strategy engine collects
//! entry and close events. For the same program and context both leave
//! identical bindings behind.

pub mod strategy;
pub mod visual;

pub use strategy::{StrategyEngine, StrategyOutput};
pub use visual::{VisualEngine, VisualOutput};

use crate::domain::context::Context;
use crate::domain::error::RuntimeError;
use crate::domain::ir::IrProgram;

pub trait Engine {
    type Output;

    fn name(&self) -> &'static str;

    /// Execute `program`, mutating `context` in place.
    fn run(&self, program: &IrProgram, context: &mut Context) -> Result<Self::Output, RuntimeError>;
}
