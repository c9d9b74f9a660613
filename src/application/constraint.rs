// Constraint builder: accumulate terms, then commit once into the solver's model

use crate::application::Solver;
use crate::domain::{
    error::{check_bounds, Result, SolverError},
    models::{ConstraintId, Row, Variable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Open,
    Committed(ConstraintId),
}

/// Builder for one linear constraint `lower <= sum(coefficient * variable) <= upper`.
///
/// Terms for the same variable add up. Once committed the builder is spent:
/// further `add_variable` or `commit` calls fail with `AlreadyCommitted`.
#[derive(Debug)]
pub struct Constraint<'s> {
    solver: &'s Solver,
    terms: Vec<(usize, f64)>,
    state: BuilderState,
}

impl<'s> Constraint<'s> {
    pub(crate) fn new(solver: &'s Solver) -> Self {
        Self {
            solver,
            terms: Vec::new(),
            state: BuilderState::Open,
        }
    }

    /// Append `coefficient * variable` to the left-hand side.
    pub fn add_variable(&mut self, variable: Variable, coefficient: f64) -> Result<()> {
        self.ensure_open()?;
        self.solver.check_handle(&variable)?;
        self.terms.push((variable.index(), coefficient));
        Ok(())
    }

    /// Register the accumulated terms with the solver as one row.
    ///
    /// Equality is expressed with `lower == upper`; use infinities for one-sided rows.
    pub fn commit(&mut self, lower: f64, upper: f64) -> Result<ConstraintId> {
        self.ensure_open()?;
        check_bounds(lower, upper)?;
        let row = Row::from_terms(self.terms.drain(..), lower, upper);
        let id = self.solver.register_row(row);
        self.state = BuilderState::Committed(id);
        Ok(id)
    }

    /// Number of terms added so far (before merging repeated variables).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, BuilderState::Committed(_))
    }

    /// The registered row, once committed.
    pub fn id(&self) -> Option<ConstraintId> {
        match self.state {
            BuilderState::Committed(id) => Some(id),
            BuilderState::Open => None,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            BuilderState::Open => Ok(()),
            BuilderState::Committed(_) => Err(SolverError::AlreadyCommitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogDestination, SolverConfig};

    fn quiet_solver() -> Solver {
        Solver::with_config(SolverConfig::new().with_log(LogDestination::Silent)).expect("solver")
    }

    #[test]
    fn commit_registers_one_row() {
        let solver = quiet_solver();
        let x = solver.binary_variable(0.0);
        let y = solver.binary_variable(0.0);

        let mut c = solver.constraint();
        assert!(c.is_empty());
        c.add_variable(x, 1.0).expect("open");
        c.add_variable(y, 2.0).expect("open");
        assert_eq!(c.len(), 2);

        let id = c.commit(0.0, 2.0).expect("valid range");
        assert_eq!(id.index(), 0);
        assert_eq!(c.id(), Some(id));
        assert!(c.is_committed());
        assert_eq!(solver.num_constraints(), 1);
    }

    #[test]
    fn spent_builder_fails_loudly() {
        let solver = quiet_solver();
        let x = solver.binary_variable(0.0);

        let mut c = solver.constraint();
        c.add_variable(x, 1.0).expect("open");
        c.commit(1.0, 1.0).expect("valid range");

        assert_eq!(c.add_variable(x, 3.0), Err(SolverError::AlreadyCommitted));
        assert_eq!(c.commit(0.0, 5.0), Err(SolverError::AlreadyCommitted));
        assert_eq!(solver.num_constraints(), 1);
    }

    #[test]
    fn inverted_range_keeps_builder_open() {
        let solver = quiet_solver();
        let x = solver.binary_variable(0.0);

        let mut c = solver.constraint();
        c.add_variable(x, 1.0).expect("open");
        assert_eq!(
            c.commit(3.0, 1.0),
            Err(SolverError::InvalidBounds {
                lower: 3.0,
                upper: 1.0
            })
        );
        assert!(!c.is_committed());
        assert_eq!(solver.num_constraints(), 0);
        c.commit(1.0, 3.0).expect("valid range");
    }

    #[test]
    fn foreign_variable_is_rejected() {
        let solver = quiet_solver();
        let other = quiet_solver();
        let foreign = other.binary_variable(0.0);

        let mut c = solver.constraint();
        assert_eq!(
            c.add_variable(foreign, 1.0),
            Err(SolverError::CrossSolverHandle {
                expected: solver.context(),
                found: other.context(),
            })
        );
        assert!(c.is_empty());
    }
}
