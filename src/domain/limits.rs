//! Runtime limits enforced per execution.

use crate::domain::error::{LimitKind, LimitViolation, RuntimeError};
use std::time::{Duration, Instant};

/// Per-run ceilings. Every violation surfaces as [`RuntimeError::LimitExceeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLimits {
    pub max_series_length: usize,
    pub max_operations: u64,
    pub max_execution_time: Duration,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_series_length: 100_000,
            max_operations: 1_000_000,
            max_execution_time: Duration::from_millis(5_000),
        }
    }
}

fn exceeded(kind: LimitKind, limit: u64, observed: u64) -> RuntimeError {
    let violation = LimitViolation {
        kind,
        limit,
        observed,
    };
    tracing::warn!(%violation, "sandbox limit hit");
    RuntimeError::LimitExceeded(violation)
}

/// Tracks one run against its [`RuntimeLimits`]. The clock starts on creation.
#[derive(Debug)]
pub struct ExecutionGuard {
    limits: RuntimeLimits,
    operations: u64,
    started: Instant,
}

impl ExecutionGuard {
    pub fn new(limits: RuntimeLimits) -> Self {
        Self {
            limits,
            operations: 0,
            started: Instant::now(),
        }
    }

    /// Reject a context whose primary series is too long. Called before any
    /// statement runs.
    pub fn check_input(&self, series_length: usize) -> Result<(), RuntimeError> {
        if series_length > self.limits.max_series_length {
            return Err(exceeded(
                LimitKind::SeriesLength,
                self.limits.max_series_length as u64,
                series_length as u64,
            ));
        }
        Ok(())
    }

    /// Count one evaluated IR node.
    pub fn tick(&mut self) -> Result<(), RuntimeError> {
        self.operations += 1;
        if self.operations > self.limits.max_operations {
            return Err(exceeded(
                LimitKind::Operations,
                self.limits.max_operations,
                self.operations,
            ));
        }
        Ok(())
    }

    /// Called after each top-level statement.
    pub fn check_elapsed(&self) -> Result<(), RuntimeError> {
        let elapsed = self.started.elapsed();
        if elapsed > self.limits.max_execution_time {
            return Err(exceeded(
                LimitKind::ExecutionTime,
                self.limits.max_execution_time.as_millis() as u64,
                elapsed.as_millis() as u64,
            ));
        }
        Ok(())
    }

    pub fn operations(&self) -> u64 {
        self.operations
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
