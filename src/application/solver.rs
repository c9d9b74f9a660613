// Solver: owner of the solving context
// Factory for variables and constraint builders; orchestrates optimization and enumeration

use crate::application::{Constraint, Solution};
use crate::domain::{
    config::SolverConfig,
    engine_service::{EngineOutcome, EngineService},
    error::{check_bounds, Result, SolverError},
    models::{Column, ConstraintId, Model, Row, SolveStatistics, Variable},
    value_objects::{ContextId, Emphasis, SolutionStatus},
};
use crate::engine::{enumerate, EngineFactory, SolutionCount};
use crate::infrastructure::EngineLog;
use std::cell::RefCell;
use std::time::Instant;
use tracing::{debug, error, trace};

/// A mixed-integer program under construction, together with the engine that solves it.
///
/// The solver exclusively owns its model. `Variable`s are copyable handles into
/// that model; `Constraint` builders and `Solution`s borrow the solver, so none
/// of them can outlive it. Dropping the solver releases everything at once.
///
/// All operations take `&self`; the model lives behind a `RefCell`, which makes
/// the solver usable from one thread at a time only.
///
/// ```no_run
/// use easymip::Solver;
///
/// # fn main() -> easymip::Result<()> {
/// let solver = Solver::create()?;
/// let corn = solver.integer_variable(0.0, 1000.0, 0.08)?;
/// let milk = solver.integer_variable(0.0, 1000.0, 0.23)?;
///
/// let mut calories = solver.constraint();
/// calories.add_variable(corn, 72.0)?;
/// calories.add_variable(milk, 121.0)?;
/// calories.commit(2000.0, 200000.0)?;
///
/// let solution = solver.solve()?;
/// println!("corn = {}", solution.value(corn)?);
/// # Ok(())
/// # }
/// ```
pub struct Solver {
    context: ContextId,
    model: RefCell<Model>,
    config: RefCell<SolverConfig>,
    engine: Box<dyn EngineService>,
    log: EngineLog,
    failure: RefCell<Option<String>>,
}

impl Solver {
    /// Create a solver with an empty model and the default configuration.
    pub fn create() -> Result<Self> {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(mut config: SolverConfig) -> Result<Self> {
        if let Some(seconds) = config.time_limit {
            config.time_limit = validate_time_limit(seconds)?;
        }

        let engine = EngineFactory::create_from_backend(config.backend)?;
        let log = EngineLog::open(&config.log)?;
        let context = ContextId::fresh();

        log.write(format_args!(
            "easymip {} [engine: {}] [emphasis: {}]",
            env!("CARGO_PKG_VERSION"),
            engine.name(),
            config.emphasis
        ));

        debug!(
            component = "solver",
            operation = "create",
            status = "success",
            context = context.inner(),
            engine = engine.name(),
            "Created solving context"
        );

        Ok(Solver {
            context,
            model: RefCell::new(Model::new()),
            config: RefCell::new(config),
            engine,
            log,
            failure: RefCell::new(None),
        })
    }

    /// Add a {0, 1} variable to the model.
    pub fn binary_variable(&self, objective: f64) -> Variable {
        self.register(Column::binary(objective))
    }

    /// Add an integer variable restricted to `[lower, upper]`.
    pub fn integer_variable(&self, lower: f64, upper: f64, objective: f64) -> Result<Variable> {
        check_bounds(lower, upper)?;
        Ok(self.register(Column::integer(lower, upper, objective)))
    }

    fn register(&self, column: Column) -> Variable {
        let mut model = self.model.borrow_mut();
        let index = model.add_column(column);
        let variable = Variable::new(self.context, index, &model.columns()[index]);
        trace!(
            component = "solver",
            operation = "add_variable",
            context = self.context.inner(),
            index,
            kind = %variable.kind(),
            "Registered variable"
        );
        variable
    }

    /// Start a new, empty constraint builder bound to this solver.
    pub fn constraint(&self) -> Constraint<'_> {
        Constraint::new(self)
    }

    /// Limit later `solve` and `count_solutions` calls to `seconds`.
    /// An infinite value removes the limit.
    pub fn set_time_limit(&self, seconds: f64) -> Result<()> {
        let limit = validate_time_limit(seconds)?;
        self.config.borrow_mut().time_limit = limit;
        Ok(())
    }

    pub fn set_emphasis(&self, emphasis: Emphasis) {
        self.config.borrow_mut().emphasis = emphasis;
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> SolverConfig {
        self.config.borrow().clone()
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn num_variables(&self) -> usize {
        self.model.borrow().num_variables()
    }

    pub fn num_constraints(&self) -> usize {
        self.model.borrow().num_constraints()
    }

    /// Optimize the current model.
    ///
    /// Blocks until the engine proves optimality or infeasibility, or the time
    /// limit expires. Infeasibility is reported through the solution status;
    /// an `Err` means the engine itself failed.
    pub fn solve(&self) -> Result<Solution<'_>> {
        self.ensure_healthy()?;
        let config = self.config();
        let model = self.model.borrow();
        let start = Instant::now();

        let mut outcome = match decide_without_engine(&model, config.tolerance) {
            Some(outcome) => outcome,
            None => {
                if let Some(limit) = config.time_limit {
                    debug!(
                        component = "solver",
                        operation = "solve",
                        engine = self.engine.name(),
                        time_limit = limit,
                        enforcement = time_limit_enforcement(self.engine.as_ref()),
                        "Solving under a time limit"
                    );
                }
                self.engine
                    .optimize(&model, &config)
                    .map_err(|e| self.poison(e))?
            }
        };

        if let Some(values) = outcome.values.as_mut() {
            model.snap_integral(values, config.tolerance);
        }

        // Accepted candidates compete with any incumbent that is not proven optimal
        if matches!(
            outcome.status,
            SolutionStatus::Feasible | SolutionStatus::Unknown
        ) {
            if let Some((pooled, pooled_objective)) = model.best_pooled(config.tolerance) {
                let engine_objective = outcome.values.as_ref().map(|v| model.objective_value(v));
                if engine_objective.map_or(true, |objective| pooled_objective < objective) {
                    debug!(
                        component = "solver",
                        operation = "solve",
                        objective = pooled_objective,
                        "Using pooled candidate as incumbent"
                    );
                    outcome = EngineOutcome::feasible(pooled);
                }
            }
        }

        let statistics = SolveStatistics::for_model(&model, self.engine.name(), start.elapsed());
        let objective = outcome.values.as_ref().map(|v| model.objective_value(v));

        self.log.write(format_args!(
            "solve: status {} objective {} time {:.3}s ({} variables, {} constraints)",
            outcome.status,
            objective.map_or_else(|| "-".to_string(), |o| o.to_string()),
            statistics.solve_time.as_secs_f64(),
            statistics.num_variables,
            statistics.num_constraints
        ));

        debug!(
            component = "solver",
            operation = "solve",
            status = %outcome.status,
            engine = self.engine.name(),
            variables = statistics.num_variables as u64,
            constraints = statistics.num_constraints as u64,
            solve_time_ms = statistics.solve_time.as_secs_f64() * 1000.0,
            "Solve finished"
        );

        Ok(Solution::solved(
            self,
            outcome.status,
            outcome.values,
            objective,
            statistics,
        ))
    }

    /// A solution with every value at zero, to be filled in and committed.
    pub fn empty_solution(&self) -> Solution<'_> {
        Solution::manual(self, self.num_variables())
    }

    /// Count every feasible assignment of the current model.
    ///
    /// This enumerates the integer lattice instead of optimizing, so it is only
    /// practical for small models. A configured time limit stops it early with
    /// `complete == false`. Bounds beyond 2^53 in magnitude fail with
    /// `DomainTooLarge`, and a count that does not fit in a `u64` fails with
    /// `CountOverflow`.
    pub fn count_solutions(&self) -> Result<SolutionCount> {
        self.ensure_healthy()?;
        let config = self.config();
        let deadline = config
            .time_limit_duration()
            .and_then(|limit| Instant::now().checked_add(limit));

        let model = self.model.borrow();
        let result = enumerate::count_solutions(&model, config.tolerance, deadline)?;

        self.log.write(format_args!(
            "count: {} solutions{}",
            result.count,
            if result.complete { "" } else { " (interrupted)" }
        ));
        Ok(result)
    }

    /// Reject handles minted by another solver.
    pub(crate) fn check_handle(&self, variable: &Variable) -> Result<()> {
        if variable.context() != self.context {
            return Err(SolverError::CrossSolverHandle {
                expected: self.context,
                found: variable.context(),
            });
        }
        Ok(())
    }

    pub(crate) fn register_row(&self, row: Row) -> ConstraintId {
        let terms = row.terms.len();
        let index = self.model.borrow_mut().add_row(row);
        trace!(
            component = "solver",
            operation = "add_constraint",
            context = self.context.inner(),
            index,
            terms,
            "Registered constraint"
        );
        ConstraintId::new(self.context, index)
    }

    pub(crate) fn objective_of(&self, values: &[f64]) -> f64 {
        self.model.borrow().objective_value(values)
    }

    /// Check a full candidate assignment and add it to the pool if it is feasible.
    pub(crate) fn submit_candidate(&self, values: &[f64]) -> bool {
        let tolerance = self.config.borrow().tolerance;
        let mut model = self.model.borrow_mut();
        let mut candidate = values.to_vec();
        candidate.resize(model.num_variables(), 0.0);

        match model.check_assignment(&candidate, tolerance) {
            Ok(()) => {
                model.add_to_pool(candidate);
                debug!(
                    component = "solver",
                    operation = "commit_solution",
                    status = "accepted",
                    pool = model.pool_len() as u64,
                    "Candidate solution accepted"
                );
                true
            }
            Err(violation) => {
                debug!(
                    component = "solver",
                    operation = "commit_solution",
                    status = "rejected",
                    reason = %violation,
                    "Candidate solution rejected"
                );
                false
            }
        }
    }

    fn ensure_healthy(&self) -> Result<()> {
        match self.failure.borrow().as_ref() {
            Some(message) => Err(SolverError::EngineFailure(message.clone())),
            None => Ok(()),
        }
    }

    /// Engine failures leave the context unusable for further solves.
    fn poison(&self, error: SolverError) -> SolverError {
        if let SolverError::EngineFailure(message) = &error {
            error!(
                component = "solver",
                operation = "solve",
                status = "failed",
                engine = self.engine.name(),
                error = %message,
                "Engine failed; solver is no longer usable"
            );
            *self.failure.borrow_mut() = Some(message.clone());
        }
        error
    }
}

impl Drop for Solver {
    fn drop(&mut self) {
        self.log.write(format_args!("released solving context {}", self.context));
        self.log.flush();
        debug!(
            component = "solver",
            operation = "release",
            context = self.context.inner(),
            "Released solving context"
        );
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("context", &self.context)
            .field("engine", &self.engine.name())
            .field("variables", &self.num_variables())
            .field("constraints", &self.num_constraints())
            .field("log", &self.log)
            .finish()
    }
}

fn validate_time_limit(seconds: f64) -> Result<Option<f64>> {
    if seconds.is_nan() || seconds < 0.0 {
        Err(SolverError::InvalidTimeLimit(seconds))
    } else if seconds.is_infinite() {
        Ok(None)
    } else {
        Ok(Some(seconds))
    }
}

/// How a configured time limit is honored by `engine`.
fn time_limit_enforcement(engine: &dyn EngineService) -> &'static str {
    if engine.supports_time_limit() {
        "native"
    } else {
        "watchdog"
    }
}

/// Models with no variables, or with an unsatisfiable empty row, are decided here.
fn decide_without_engine(model: &Model, tolerance: f64) -> Option<EngineOutcome> {
    if !model.empty_rows_satisfied(tolerance) {
        return Some(EngineOutcome::infeasible());
    }
    if model.num_variables() == 0 {
        return Some(EngineOutcome::optimal(Vec::new()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogDestination, VariableKind};

    fn quiet_solver() -> Solver {
        Solver::with_config(SolverConfig::new().with_log(LogDestination::Silent)).expect("solver")
    }

    #[test]
    fn variables_are_registered_immediately() {
        let solver = quiet_solver();
        let b = solver.binary_variable(1.5);
        let x = solver.integer_variable(-3.0, 7.0, 2.0).expect("valid bounds");

        assert_eq!(solver.num_variables(), 2);
        assert_eq!(b.kind(), VariableKind::Binary);
        assert_eq!((b.lower_bound(), b.upper_bound(), b.objective()), (0.0, 1.0, 1.5));
        assert_eq!(x.kind(), VariableKind::IntegerBounded);
        assert_eq!((x.lower_bound(), x.upper_bound(), x.objective()), (-3.0, 7.0, 2.0));
        assert_eq!(x.index(), 1);
        assert_eq!(x.context(), solver.context());
    }

    #[test]
    fn inverted_bounds_fail_fast() {
        let solver = quiet_solver();
        assert_eq!(
            solver.integer_variable(5.0, 1.0, 0.0),
            Err(SolverError::InvalidBounds {
                lower: 5.0,
                upper: 1.0
            })
        );
        assert_eq!(solver.num_variables(), 0);
    }

    #[test]
    fn time_limit_validation() {
        let solver = quiet_solver();
        solver.set_time_limit(12.0).expect("valid");
        assert_eq!(solver.config().time_limit, Some(12.0));

        solver.set_time_limit(f64::INFINITY).expect("clears limit");
        assert_eq!(solver.config().time_limit, None);

        assert_eq!(
            solver.set_time_limit(-1.0),
            Err(SolverError::InvalidTimeLimit(-1.0))
        );
        assert!(solver.set_time_limit(f64::NAN).is_err());
        assert!(Solver::with_config(SolverConfig::new().with_time_limit(-5.0)).is_err());
    }

    #[test]
    fn emphasis_is_configurable() {
        let solver = quiet_solver();
        assert_eq!(solver.config().emphasis, Emphasis::Feasibility);
        solver.set_emphasis(Emphasis::Optimality);
        assert_eq!(solver.config().emphasis, Emphasis::Optimality);
    }

    #[test]
    fn empty_model_is_trivially_optimal() {
        let solver = quiet_solver();
        let solution = solver.solve().expect("solves");
        assert!(solution.is_optimal());
        assert_eq!(solution.objective(), Ok(0.0));
    }

    #[test]
    fn unsatisfiable_empty_row_is_infeasible() {
        let solver = quiet_solver();
        let x = solver.binary_variable(0.0);
        solver.constraint().commit(1.0, 2.0).expect("valid range");

        let solution = solver.solve().expect("solves");
        assert_eq!(solution.status(), SolutionStatus::Infeasible);
        assert!(!solution.is_feasible());
        assert_eq!(
            solution.value(x),
            Err(SolverError::NoSolution(SolutionStatus::Infeasible))
        );
    }

    #[test]
    fn poisoned_solver_refuses_to_solve() {
        let solver = quiet_solver();
        solver.binary_variable(0.0);
        let err = solver.poison(SolverError::EngineFailure("boom".to_string()));
        assert_eq!(err, SolverError::EngineFailure("boom".to_string()));
        assert_eq!(
            solver.solve().unwrap_err(),
            SolverError::EngineFailure("boom".to_string())
        );
        assert!(solver.count_solutions().is_err());
    }

    struct NativeLimitEngine;

    impl EngineService for NativeLimitEngine {
        fn optimize(&self, _model: &Model, _config: &SolverConfig) -> Result<EngineOutcome> {
            Ok(EngineOutcome::unknown())
        }

        fn name(&self) -> &'static str {
            "native-limit"
        }

        fn supports_time_limit(&self) -> bool {
            true
        }
    }

    #[test]
    fn time_limit_enforcement_follows_engine_support() {
        let microlp = crate::engine::MicrolpEngine::new();
        assert_eq!(time_limit_enforcement(&microlp), "watchdog");
        assert_eq!(time_limit_enforcement(&NativeLimitEngine), "native");
    }

    #[test]
    fn debug_output_names_engine() {
        let solver = quiet_solver();
        let debug = format!("{:?}", solver);
        assert!(debug.contains("microlp") || debug.contains("HiGHS"));
    }
}
