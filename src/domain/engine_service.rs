// Domain service interface for the external MIP engine
// The modeling layer only talks to engines through this contract, so backends can be swapped

use super::config::SolverConfig;
use super::error::Result;
use super::models::Model;
use super::value_objects::SolutionStatus;

/// What an engine hands back after optimizing
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub status: SolutionStatus,
    /// Incumbent values indexed like the model's columns, if any exist.
    pub values: Option<Vec<f64>>,
}

impl EngineOutcome {
    pub fn optimal(values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values: Some(values),
        }
    }

    pub fn feasible(values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Feasible,
            values: Some(values),
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            status: SolutionStatus::Unknown,
            values: None,
        }
    }
}

/// Contract every engine adapter implements.
///
/// The engine is a black box: it receives the full model (variables with kind,
/// bounds and objective; rows with coefficient vectors and ranges) together
/// with the global configuration, and minimizes the objective.
pub trait EngineService: Send + Sync {
    /// Minimize the model's objective subject to its rows and bounds.
    ///
    /// Infeasibility is reported through the outcome status. An `Err` means the
    /// engine itself broke and its state can no longer be trusted.
    fn optimize(&self, model: &Model, config: &SolverConfig) -> Result<EngineOutcome>;

    /// Get the name of this engine
    fn name(&self) -> &'static str;

    /// Whether the engine enforces time limits natively
    fn supports_time_limit(&self) -> bool;
}
