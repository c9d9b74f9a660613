// microlp engine adapter
// Implements the EngineService interface by translating the model through good_lp

use crate::domain::{
    config::SolverConfig,
    engine_service::{EngineOutcome, EngineService},
    error::{Result, SolverError},
    models::{Column, Model},
    value_objects::{Emphasis, VariableKind},
};
use good_lp::{
    constraint, solvers::microlp::microlp, variable, Expression, ProblemVariables, ResolutionError,
    Solution as _, SolverModel, Variable as GoodLpVariable, VariableDefinition,
};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use tracing::{debug, trace, warn};

/// Pure Rust branch-and-bound engine.
///
/// microlp cannot be interrupted, so each optimization runs on a worker thread
/// and the configured time limit bounds how long the caller waits for it.
pub struct MicrolpEngine;

impl MicrolpEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrolpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineService for MicrolpEngine {
    fn optimize(&self, model: &Model, config: &SolverConfig) -> Result<EngineOutcome> {
        if config.emphasis != Emphasis::Default {
            trace!(
                component = "engine",
                engine = self.name(),
                emphasis = %config.emphasis,
                "Emphasis hint not supported, ignoring"
            );
        }

        let snapshot = model.clone();
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("easymip-microlp".to_string())
            .spawn(move || {
                let _ = tx.send(run(&snapshot));
            })
            .map_err(|e| SolverError::EngineFailure(format!("cannot start microlp worker: {}", e)))?;

        let received = match config.time_limit_duration() {
            Some(limit) => rx.recv_timeout(limit),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    component = "engine",
                    engine = self.name(),
                    time_limit = config.time_limit,
                    "Time limit reached before microlp finished"
                );
                Ok(EngineOutcome::unknown())
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::EngineFailure(
                "microlp worker terminated without a result".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "microlp"
    }

    fn supports_time_limit(&self) -> bool {
        false
    }
}

fn definition(column: &Column) -> VariableDefinition {
    match column.kind {
        VariableKind::Binary => variable().binary(),
        VariableKind::IntegerBounded => {
            let mut def = variable().integer();
            if column.lower.is_finite() {
                def = def.min(column.lower);
            }
            if column.upper.is_finite() {
                def = def.max(column.upper);
            }
            def
        }
    }
}

fn run(model: &Model) -> Result<EngineOutcome> {
    let mut vars = ProblemVariables::new();
    let columns: Vec<GoodLpVariable> = model
        .columns()
        .iter()
        .map(|column| vars.add(definition(column)))
        .collect();

    let objective: Expression = model
        .columns()
        .iter()
        .zip(&columns)
        .filter(|(column, _)| column.objective != 0.0)
        .map(|(column, &var)| column.objective * var)
        .sum();

    let mut problem = vars.minimise(objective).using(microlp);

    // Whole row in one expression; rows without terms never reach the engine
    for row in model.rows().iter().filter(|row| !row.terms.is_empty()) {
        let lhs: Expression = row
            .terms
            .iter()
            .map(|&(index, coefficient)| coefficient * columns[index])
            .sum();

        if row.is_equality() {
            problem = problem.with(constraint::eq(lhs, row.lower));
            continue;
        }
        if row.lower.is_finite() && row.upper.is_finite() {
            problem = problem.with(constraint::geq(lhs.clone(), row.lower));
            problem = problem.with(constraint::leq(lhs, row.upper));
        } else if row.lower.is_finite() {
            problem = problem.with(constraint::geq(lhs, row.lower));
        } else if row.upper.is_finite() {
            problem = problem.with(constraint::leq(lhs, row.upper));
        }
    }

    match problem.solve() {
        Ok(solution) => {
            let values = columns.iter().map(|&var| solution.value(var)).collect();
            Ok(EngineOutcome::optimal(values))
        }
        Err(ResolutionError::Infeasible) => Ok(EngineOutcome::infeasible()),
        Err(ResolutionError::Unbounded) => {
            debug!(
                component = "engine",
                engine = "microlp",
                "Objective is unbounded, no incumbent reported"
            );
            Ok(EngineOutcome::unknown())
        }
        Err(e) => Err(SolverError::EngineFailure(format!("microlp: {}", e))),
    }
}
