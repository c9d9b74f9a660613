// HiGHS engine adapter
// Implements the EngineService interface for HiGHS
// This is an adapter pattern - translates the model arena to the HiGHS row API

use crate::domain::{
    config::{LogDestination, SolverConfig},
    engine_service::{EngineOutcome, EngineService},
    error::{Result, SolverError},
    models::Model,
    value_objects::Emphasis,
};
use highs::{HighsModelStatus, RowProblem, Sense};
use tracing::{debug, warn};

/// Native HiGHS engine.
///
/// HiGHS writes its own log through a C callback this adapter does not hook,
/// so its native output only reaches a `LogDestination::File`. Under `Tracing`
/// or `Silent` the native log is switched off; the solver's own summary lines
/// still go to the configured destination.
pub struct HighsEngine;

impl HighsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineService for HighsEngine {
    fn optimize(&self, model: &Model, config: &SolverConfig) -> Result<EngineOutcome> {
        // Use HiGHS RowProblem (add variables first, then constraints)
        let mut pb = RowProblem::default();

        let cols: Vec<_> = model
            .columns()
            .iter()
            .map(|column| pb.add_integer_column(column.objective, column.lower..=column.upper))
            .collect();

        // Each row goes over as one batch of (column, coefficient) pairs
        for row in model.rows().iter().filter(|row| !row.terms.is_empty()) {
            let terms: Vec<_> = row
                .terms
                .iter()
                .map(|&(index, coefficient)| (cols[index], coefficient))
                .collect();
            pb.add_row(row.lower..=row.upper, &terms);
        }

        let mut highs = pb.optimise(Sense::Minimise);

        match native_log_file(&config.log) {
            Some(log_file) => {
                highs.set_option("output_flag", true);
                highs.set_option("log_to_console", false);
                highs.set_option("log_file", log_file.as_str());
            }
            None => highs.set_option("output_flag", false),
        }
        if let Some(seconds) = config.time_limit {
            highs.set_option("time_limit", seconds);
        }
        match config.emphasis {
            Emphasis::Default => {}
            Emphasis::Feasibility => highs.set_option("mip_heuristic_effort", 0.3),
            Emphasis::Optimality => highs.set_option("mip_rel_gap", 0.0),
        }

        let solved = highs.try_solve().map_err(|status| {
            SolverError::EngineFailure(format!("HiGHS failed to run: {:?}", status))
        })?;

        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                Ok(EngineOutcome::optimal(values))
            }
            HighsModelStatus::Infeasible => Ok(EngineOutcome::infeasible()),
            HighsModelStatus::ReachedTimeLimit
            | HighsModelStatus::ReachedIterationLimit
            | HighsModelStatus::ObjectiveBound
            | HighsModelStatus::ObjectiveTarget => {
                // A limit may stop HiGHS before it has any incumbent; only keep
                // the reported point if it actually satisfies the model.
                let values = solved.get_solution().columns().to_vec();
                if values.len() == model.num_variables()
                    && model.check_assignment(&values, config.tolerance).is_ok()
                {
                    Ok(EngineOutcome::feasible(values))
                } else {
                    warn!(
                        component = "engine",
                        engine = self.name(),
                        status = ?solved.status(),
                        "Limit reached without an incumbent"
                    );
                    Ok(EngineOutcome::unknown())
                }
            }
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                debug!(
                    component = "engine",
                    engine = self.name(),
                    status = ?solved.status(),
                    "No bounded incumbent reported"
                );
                Ok(EngineOutcome::unknown())
            }
            status => Err(SolverError::EngineFailure(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "HiGHS"
    }

    fn supports_time_limit(&self) -> bool {
        true
    }
}

/// File HiGHS should write its native log to, if any.
fn native_log_file(log: &LogDestination) -> Option<String> {
    match log {
        LogDestination::File(path) => Some(path.to_string_lossy().into_owned()),
        LogDestination::Tracing | LogDestination::Silent => None,
    }
}
