// Solver configuration: limits, emphasis, logging destination and engine choice

use super::value_objects::{Emphasis, SolverBackend};
use std::path::PathBuf;
use std::time::Duration;

/// Where the engine's own diagnostic output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Emit as `tracing` events on target `easymip::engine`
    #[default]
    Tracing,
    /// Append to a file, opened when the solver is created
    File(PathBuf),
    /// Discard
    Silent,
}

/// Configuration for a solver instance
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    pub emphasis: Emphasis,
    pub log: LogDestination,
    pub backend: SolverBackend,
    /// Absolute tolerance used when checking candidate assignments.
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            emphasis: Emphasis::default(),
            log: LogDestination::default(),
            backend: SolverBackend::default(),
            tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn with_log(mut self, log: LogDestination) -> Self {
        self.log = log;
        self
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The time limit as a `Duration`, if a finite one is set.
    pub fn time_limit_duration(&self) -> Option<Duration> {
        self.time_limit
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }
}
