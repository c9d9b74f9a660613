// Domain value objects: small copyable concepts shared across the modeling layer

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

/// Identity of one solving context.
///
/// Every `Solver` draws a fresh id at creation; handles derived from it carry
/// the id so that a handle presented to the wrong solver is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Binary variable (x ∈ {0, 1})
    Binary,
    /// Integer variable within [lower, upper]
    IntegerBounded,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Binary => write!(f, "BINARY"),
            VariableKind::IntegerBounded => write!(f, "INTEGER"),
        }
    }
}

/// Terminal status reported with a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// Proven optimal incumbent
    Optimal,
    /// Incumbent found but optimality not proven (limits, warm start)
    Feasible,
    /// Proven that no assignment satisfies the model
    Infeasible,
    /// Engine stopped without a conclusion
    Unknown,
}

impl SolutionStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    /// Anything short of proven infeasibility counts as feasible.
    pub fn is_feasible(self) -> bool {
        !matches!(self, SolutionStatus::Infeasible)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Feasible => write!(f, "Feasible"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Qualitative hint passed to the engine; never a hard requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    /// Engine defaults
    Default,
    /// Find a feasible assignment quickly
    #[default]
    Feasibility,
    /// Spend effort on proving optimality
    Optimality,
}

impl fmt::Display for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emphasis::Default => write!(f, "default"),
            Emphasis::Feasibility => write!(f, "feasibility"),
            Emphasis::Optimality => write!(f, "optimality"),
        }
    }
}

/// Solver engine to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    /// HiGHS when compiled in, microlp otherwise
    #[default]
    Auto,
    /// Pure Rust microlp, driven through good_lp
    Microlp,
    /// HiGHS (requires the `highs` feature)
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Microlp => write!(f, "microlp"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}
