//! A thin algebraic modeling layer for mixed-integer linear programs.
//!
//! Describe a model with [`Solver`], [`Variable`] and [`Constraint`], then
//! [`Solver::solve`] it through an external engine and read the [`Solution`].

// Domain layer: models, value objects, configuration and the engine contract
pub mod domain;

// Application layer: solver lifecycle, constraint builders, solutions
pub mod application;

// Engine adapters: concrete implementations of EngineService
pub mod engine;

// Infrastructure layer: engine log destination
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    ConstraintId, ContextId, Emphasis, LogDestination, Result, SolutionStatus, SolveStatistics,
    SolverBackend, SolverConfig, SolverError, Variable, VariableKind,
};

pub use application::{Constraint, Solution, Solver};

pub use engine::{EngineFactory, MicrolpEngine, SolutionCount};

#[cfg(feature = "highs")]
pub use engine::HighsEngine;
