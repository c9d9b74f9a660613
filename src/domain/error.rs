// Error taxonomy for the modeling layer
// Contract violations are raised at the API boundary; infeasibility is a status, not an error

use super::value_objects::{ContextId, SolutionStatus};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid bounds: lower bound ({lower}) must not exceed upper bound ({upper})")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Builder already committed")]
    AlreadyCommitted,

    #[error("Handle from solver context {found} used with solver context {expected}")]
    CrossSolverHandle {
        expected: ContextId,
        found: ContextId,
    },

    #[error("No solution available (status: {0})")]
    NoSolution(SolutionStatus),

    #[error("Variable {0} was created after this solution was produced")]
    VariableNotInSolution(usize),

    #[error("Solution produced by the engine is read-only")]
    ReadOnlySolution,

    #[error("Invalid time limit: {0} seconds")]
    InvalidTimeLimit(f64),

    #[error("Variable {0} has an unbounded domain and cannot be enumerated")]
    UnboundedDomain(usize),

    #[error("Variable {0} has bounds too large to enumerate exactly")]
    DomainTooLarge(usize),

    #[error("Number of solutions does not fit in a u64")]
    CountOverflow,

    #[error("Engine failure: {0}")]
    EngineFailure(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Reject NaN and inverted ranges before anything reaches the engine.
pub(crate) fn check_bounds(lower: f64, upper: f64) -> Result<()> {
    if lower <= upper {
        Ok(())
    } else {
        Err(SolverError::InvalidBounds { lower, upper })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_equal_and_infinite() {
        assert!(check_bounds(3.0, 3.0).is_ok());
        assert!(check_bounds(f64::NEG_INFINITY, f64::INFINITY).is_ok());
    }

    #[test]
    fn bounds_reject_inverted_and_nan() {
        assert_eq!(
            check_bounds(2.0, 1.0),
            Err(SolverError::InvalidBounds {
                lower: 2.0,
                upper: 1.0
            })
        );
        assert!(check_bounds(f64::NAN, 1.0).is_err());
        assert!(check_bounds(0.0, f64::NAN).is_err());
    }

    #[test]
    fn display_mentions_status() {
        let msg = SolverError::NoSolution(SolutionStatus::Infeasible).to_string();
        assert!(msg.contains("Infeasible"));
    }
}
