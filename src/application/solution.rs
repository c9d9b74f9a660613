// Solution: view over assigned values plus terminal status
// Engine-produced solutions are read-only; manual ones are filled in and submitted back

use crate::application::Solver;
use crate::domain::{
    error::{Result, SolverError},
    models::{SolveStatistics, Variable},
    value_objects::SolutionStatus,
};

#[derive(Debug)]
enum Origin {
    Engine(SolveStatistics),
    Manual { committed: bool },
}

/// Assignment of values to a solver's variables.
#[derive(Debug)]
pub struct Solution<'s> {
    solver: &'s Solver,
    status: SolutionStatus,
    values: Option<Vec<f64>>,
    objective: Option<f64>,
    origin: Origin,
}

impl<'s> Solution<'s> {
    pub(crate) fn solved(
        solver: &'s Solver,
        status: SolutionStatus,
        values: Option<Vec<f64>>,
        objective: Option<f64>,
        statistics: SolveStatistics,
    ) -> Self {
        Self {
            solver,
            status,
            values,
            objective,
            origin: Origin::Engine(statistics),
        }
    }

    pub(crate) fn manual(solver: &'s Solver, num_variables: usize) -> Self {
        Self {
            solver,
            status: SolutionStatus::Unknown,
            values: Some(vec![0.0; num_variables]),
            objective: None,
            origin: Origin::Manual { committed: false },
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// True unless infeasibility was proven. Does not imply values are present;
    /// see [`Solution::has_incumbent`].
    pub fn is_feasible(&self) -> bool {
        self.status.is_feasible()
    }

    pub fn has_incumbent(&self) -> bool {
        self.values.is_some()
    }

    /// Value assigned to `variable`.
    ///
    /// Fails with `NoSolution` when no incumbent exists, so a stale number is
    /// never returned for an infeasible or undecided model.
    pub fn value(&self, variable: Variable) -> Result<f64> {
        self.solver.check_handle(&variable)?;
        let values = self
            .values
            .as_ref()
            .ok_or(SolverError::NoSolution(self.status))?;
        match (values.get(variable.index()), &self.origin) {
            (Some(&value), _) => Ok(value),
            (None, Origin::Manual { .. }) => Ok(0.0),
            (None, Origin::Engine(_)) => Err(SolverError::VariableNotInSolution(variable.index())),
        }
    }

    /// Objective value of the assignment: sum of coefficient * value.
    pub fn objective(&self) -> Result<f64> {
        match (&self.origin, &self.values) {
            (_, None) => Err(SolverError::NoSolution(self.status)),
            (Origin::Engine(_), Some(_)) => self.objective.ok_or(SolverError::NoSolution(self.status)),
            (Origin::Manual { .. }, Some(values)) => Ok(self.solver.objective_of(values)),
        }
    }

    /// Raw values indexed by variable position, if an incumbent exists.
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    /// Statistics of the solve that produced this solution.
    pub fn statistics(&self) -> Option<&SolveStatistics> {
        match &self.origin {
            Origin::Engine(statistics) => Some(statistics),
            Origin::Manual { .. } => None,
        }
    }

    /// Assign a value in a manually built solution.
    pub fn set_value(&mut self, variable: Variable, value: f64) -> Result<()> {
        self.ensure_editable()?;
        self.solver.check_handle(&variable)?;
        let values = self.values.get_or_insert_with(Vec::new);
        if values.len() <= variable.index() {
            values.resize(variable.index() + 1, 0.0);
        }
        values[variable.index()] = value;
        Ok(())
    }

    /// Submit the assignment to the solver's incumbent pool.
    ///
    /// Returns whether it was accepted, i.e. satisfies every bound and
    /// constraint. An accepted solution is spent and reports `Feasible`; a
    /// rejected one stays editable.
    pub fn commit(&mut self) -> Result<bool> {
        self.ensure_editable()?;
        let values = self.values.as_deref().unwrap_or(&[]);
        let accepted = self.solver.submit_candidate(values);
        if accepted {
            self.status = SolutionStatus::Feasible;
            self.origin = Origin::Manual { committed: true };
        }
        Ok(accepted)
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.origin {
            Origin::Engine(_) => Err(SolverError::ReadOnlySolution),
            Origin::Manual { committed: true } => Err(SolverError::AlreadyCommitted),
            Origin::Manual { committed: false } => Ok(()),
        }
    }
}
