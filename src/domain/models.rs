use super::value_objects::{ContextId, VariableKind};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

// Engines report integral values with some floating-point noise
const INTEGRALITY_SLACK: f64 = 1e-5;

/// Decision variable handle
///
/// A lightweight, copyable reference into the model owned by the `Solver`
/// that created it. Identity is the (context, index) pair; the kind, bounds
/// and objective coefficient are a read-only copy of what was registered.
#[derive(Debug, Clone, Copy)]
pub struct Variable {
    context: ContextId,
    index: usize,
    kind: VariableKind,
    lower_bound: f64,
    upper_bound: f64,
    objective: f64,
}

impl Variable {
    pub(crate) fn new(context: ContextId, index: usize, column: &Column) -> Self {
        Self {
            context,
            index,
            kind: column.kind,
            lower_bound: column.lower,
            upper_bound: column.upper,
            objective: column.objective,
        }
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Position of the variable in its solver's model.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn context(&self) -> ContextId {
        self.context
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context && self.index == other.index
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.context.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}:{}", self.index, self.kind)
    }
}

/// Handle to a committed constraint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId {
    context: ContextId,
    index: usize,
}

impl ConstraintId {
    pub(crate) fn new(context: ContextId, index: usize) -> Self {
        Self { context, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn context(&self) -> ContextId {
        self.context
    }
}

/// A variable as registered in the model
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub kind: VariableKind,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

impl Column {
    pub fn binary(objective: f64) -> Self {
        Self {
            kind: VariableKind::Binary,
            lower: 0.0,
            upper: 1.0,
            objective,
        }
    }

    pub fn integer(lower: f64, upper: f64, objective: f64) -> Self {
        Self {
            kind: VariableKind::IntegerBounded,
            lower,
            upper,
            objective,
        }
    }
}

/// A committed linear constraint: lower <= sum(coefficient * x[index]) <= upper
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub terms: Vec<(usize, f64)>,
    pub lower: f64,
    pub upper: f64,
}

impl Row {
    /// Build a row from raw terms, summing coefficients of repeated variables.
    /// Terms keep the order in which each variable first appeared.
    pub fn from_terms(terms: impl IntoIterator<Item = (usize, f64)>, lower: f64, upper: f64) -> Self {
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut merged: Vec<(usize, f64)> = Vec::new();
        for (index, coefficient) in terms {
            match position.get(&index) {
                Some(&at) => merged[at].1 += coefficient,
                None => {
                    position.insert(index, merged.len());
                    merged.push((index, coefficient));
                }
            }
        }
        Self {
            terms: merged,
            lower,
            upper,
        }
    }

    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(index, coefficient)| coefficient * values.get(index).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_equality(&self) -> bool {
        self.lower == self.upper
    }
}

/// Why a candidate assignment was rejected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    Bound { variable: usize, value: f64 },
    Integrality { variable: usize, value: f64 },
    Row { row: usize, activity: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Bound { variable, value } => {
                write!(f, "variable {} value {} outside its bounds", variable, value)
            }
            Violation::Integrality { variable, value } => {
                write!(f, "variable {} value {} is not integral", variable, value)
            }
            Violation::Row { row, activity } => {
                write!(f, "constraint {} activity {} outside its range", row, activity)
            }
        }
    }
}

/// The live model owned by one solver: the arena that variable and
/// constraint handles index into, plus the pool of accepted candidates.
#[derive(Debug, Clone, Default)]
pub struct Model {
    columns: Vec<Column>,
    rows: Vec<Row>,
    pool: Vec<Vec<f64>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, column: Column) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    pub fn add_row(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_variables(&self) -> usize {
        self.columns.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn num_of_kind(&self, kind: VariableKind) -> usize {
        self.columns.iter().filter(|c| c.kind == kind).count()
    }

    /// Objective value of an assignment; missing entries count as zero.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.objective * value)
            .sum()
    }

    /// Check an assignment against bounds, integrality and every row.
    pub fn check_assignment(&self, values: &[f64], tolerance: f64) -> Result<(), Violation> {
        for (variable, column) in self.columns.iter().enumerate() {
            let value = values.get(variable).copied().unwrap_or(0.0);
            if !value.is_finite()
                || value < column.lower - tolerance
                || value > column.upper + tolerance
            {
                return Err(Violation::Bound { variable, value });
            }
            if (value - value.round()).abs() > tolerance {
                return Err(Violation::Integrality { variable, value });
            }
        }
        for (row_index, row) in self.rows.iter().enumerate() {
            let activity = row.activity(values);
            if activity < row.lower - tolerance || activity > row.upper + tolerance {
                return Err(Violation::Row {
                    row: row_index,
                    activity,
                });
            }
        }
        Ok(())
    }

    /// Rows without terms can be decided without an engine.
    pub fn empty_rows_satisfied(&self, tolerance: f64) -> bool {
        self.rows
            .iter()
            .filter(|row| row.terms.is_empty())
            .all(|row| row.lower <= tolerance && row.upper >= -tolerance)
    }

    /// Round values of integer-kind variables that are within tolerance.
    pub fn snap_integral(&self, values: &mut [f64], tolerance: f64) {
        for value in values.iter_mut() {
            let rounded = value.round();
            if (*value - rounded).abs() <= tolerance.max(INTEGRALITY_SLACK) {
                *value = rounded;
            }
        }
    }

    pub fn add_to_pool(&mut self, values: Vec<f64>) {
        self.pool.push(values);
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Best pooled candidate that still satisfies the current model.
    pub fn best_pooled(&self, tolerance: f64) -> Option<(Vec<f64>, f64)> {
        self.pool
            .iter()
            .map(|values| {
                let mut padded = values.clone();
                padded.resize(self.columns.len(), 0.0);
                padded
            })
            .filter(|values| self.check_assignment(values, tolerance).is_ok())
            .map(|values| {
                let objective = self.objective_value(&values);
                (values, objective)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Statistics about one solve
#[derive(Debug, Clone, Default)]
pub struct SolveStatistics {
    pub engine: &'static str,
    pub solve_time: Duration,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub num_binary_vars: usize,
    pub num_integer_vars: usize,
}

impl SolveStatistics {
    pub(crate) fn for_model(model: &Model, engine: &'static str, solve_time: Duration) -> Self {
        Self {
            engine,
            solve_time,
            num_variables: model.num_variables(),
            num_constraints: model.num_constraints(),
            num_binary_vars: model.num_of_kind(VariableKind::Binary),
            num_integer_vars: model.num_of_kind(VariableKind::IntegerBounded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_model() -> Model {
        let mut model = Model::new();
        model.add_column(Column::binary(1.0));
        model.add_column(Column::integer(0.0, 5.0, 2.0));
        model.add_row(Row::from_terms([(0, 1.0), (1, 1.0)], 2.0, 4.0));
        model
    }

    #[test]
    fn repeated_terms_are_additive() {
        let row = Row::from_terms([(3, 1.0), (1, 2.0), (3, 4.0)], 0.0, 0.0);
        assert_eq!(row.terms, vec![(3, 5.0), (1, 2.0)]);
        assert!(row.is_equality());
    }

    #[test]
    fn activity_treats_missing_values_as_zero() {
        let row = Row::from_terms([(0, 2.0), (5, 3.0)], 0.0, 10.0);
        assert_eq!(row.activity(&[1.5]), 3.0);
    }

    #[test]
    fn check_assignment_accepts_feasible_point() {
        let model = two_var_model();
        assert_eq!(model.check_assignment(&[1.0, 2.0], 1e-6), Ok(()));
        assert_eq!(model.objective_value(&[1.0, 2.0]), 5.0);
    }

    #[test]
    fn check_assignment_reports_violations() {
        let model = two_var_model();
        assert!(matches!(
            model.check_assignment(&[2.0, 0.0], 1e-6),
            Err(Violation::Bound { variable: 0, .. })
        ));
        assert!(matches!(
            model.check_assignment(&[1.0, 1.5], 1e-6),
            Err(Violation::Integrality { variable: 1, .. })
        ));
        assert!(matches!(
            model.check_assignment(&[0.0, 5.0], 1e-6),
            Err(Violation::Row { row: 0, .. })
        ));
    }

    #[test]
    fn pooled_candidates_are_rechecked() {
        let mut model = two_var_model();
        model.add_to_pool(vec![1.0, 3.0]);
        model.add_to_pool(vec![0.0, 2.0]);
        let (values, objective) = model.best_pooled(1e-6).expect("pooled candidate");
        assert_eq!(values, vec![0.0, 2.0]);
        assert_eq!(objective, 4.0);

        // A new row excludes both candidates
        model.add_row(Row::from_terms([(1, 1.0)], 4.0, 5.0));
        assert!(model.best_pooled(1e-6).is_none());
        assert_eq!(model.pool_len(), 2);
    }

    #[test]
    fn empty_rows() {
        let mut model = Model::new();
        model.add_row(Row::from_terms([], -1.0, 1.0));
        assert!(model.empty_rows_satisfied(1e-6));
        model.add_row(Row::from_terms([], 1.0, 2.0));
        assert!(!model.empty_rows_satisfied(1e-6));
    }

    #[test]
    fn variable_identity_is_handle_based() {
        let context = ContextId::fresh();
        let column = Column::binary(0.0);
        let a = Variable::new(context, 0, &column);
        let b = Variable::new(context, 0, &Column::integer(0.0, 9.0, 1.0));
        let c = Variable::new(context, 1, &column);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "x0:BINARY");
    }
}
