// Exhaustive enumeration of feasible assignments
// Depth-first search over the integer lattice with interval propagation on every row

use crate::domain::{
    error::{Result, SolverError},
    models::{Model, Row},
};
use std::time::Instant;
use tracing::{debug, warn};

/// Result of counting the feasible assignments of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionCount {
    pub count: u64,
    /// `false` when a limit stopped the enumeration; `count` is then a lower bound.
    pub complete: bool,
}

type Domain = (i64, i64);

/// Largest magnitude a bound may have and still be enumerated: 2^53, so every
/// integer in the domain converts to and from `f64` exactly.
const MAX_ENUMERABLE_BOUND: f64 = 9_007_199_254_740_992.0;

struct Search<'m> {
    model: &'m Model,
    /// Rows with at least one term
    rows: Vec<&'m Row>,
    tolerance: f64,
    deadline: Option<Instant>,
    nodes: u64,
    interrupted: bool,
}

/// Count every assignment that satisfies the model's bounds and rows.
///
/// Fails with `UnboundedDomain` for infinite bounds, `DomainTooLarge` for bounds
/// beyond 2^53 in magnitude, and `CountOverflow` when the exact count does not
/// fit in a `u64`.
pub fn count_solutions(model: &Model, tolerance: f64, deadline: Option<Instant>) -> Result<SolutionCount> {
    let mut domains: Vec<Domain> = Vec::with_capacity(model.num_variables());
    for (index, column) in model.columns().iter().enumerate() {
        if !column.lower.is_finite() || !column.upper.is_finite() {
            return Err(SolverError::UnboundedDomain(index));
        }
        let lower = (column.lower - tolerance).ceil();
        let upper = (column.upper + tolerance).floor();
        if lower.abs() > MAX_ENUMERABLE_BOUND || upper.abs() > MAX_ENUMERABLE_BOUND {
            return Err(SolverError::DomainTooLarge(index));
        }
        let (lower, upper) = (lower as i64, upper as i64);
        if lower > upper {
            return Ok(SolutionCount {
                count: 0,
                complete: true,
            });
        }
        domains.push((lower, upper));
    }

    if !model.empty_rows_satisfied(tolerance) {
        return Ok(SolutionCount {
            count: 0,
            complete: true,
        });
    }

    // Variables outside every row contribute their domain size as a factor
    let mut constrained = vec![false; domains.len()];
    for row in model.rows() {
        for &(index, coefficient) in &row.terms {
            if coefficient != 0.0 {
                constrained[index] = true;
            }
        }
    }
    let mut free_factor: u64 = 1;
    for (index, &(lower, upper)) in domains.iter().enumerate() {
        if !constrained[index] {
            free_factor = domain_size(lower, upper)
                .and_then(|size| free_factor.checked_mul(size))
                .ok_or(SolverError::CountOverflow)?;
        }
    }

    let mut search = Search {
        model,
        rows: model.rows().iter().filter(|row| !row.terms.is_empty()).collect(),
        tolerance,
        deadline,
        nodes: 0,
        interrupted: false,
    };

    // Pin free variables so the search only branches on constrained ones
    for (index, domain) in domains.iter_mut().enumerate() {
        if !constrained[index] {
            domain.1 = domain.0;
        }
    }

    let constrained_count = search.explore(domains)?;
    let count = constrained_count
        .checked_mul(free_factor)
        .ok_or(SolverError::CountOverflow)?;

    if search.interrupted {
        warn!(
            component = "enumerate",
            operation = "count",
            status = "interrupted",
            nodes = search.nodes,
            partial = count,
            "Time limit reached during enumeration"
        );
    } else {
        debug!(
            component = "enumerate",
            operation = "count",
            status = "success",
            nodes = search.nodes,
            count,
            "Enumeration finished"
        );
    }

    Ok(SolutionCount {
        count,
        complete: !search.interrupted,
    })
}

/// Number of integers in `[lower, upper]`, if it fits in a `u64`.
fn domain_size(lower: i64, upper: i64) -> Option<u64> {
    let span = upper.checked_sub(lower)?;
    u64::try_from(span).ok()?.checked_add(1)
}

impl Search<'_> {
    fn explore(&mut self, mut domains: Vec<Domain>) -> Result<u64> {
        if self.interrupted {
            return Ok(0);
        }
        self.nodes += 1;
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.interrupted = true;
                return Ok(0);
            }
        }

        if !self.propagate(&mut domains) {
            return Ok(0);
        }

        // Branch on the unfixed variable with the smallest domain
        let branch = domains
            .iter()
            .enumerate()
            .filter(|(_, (lower, upper))| lower < upper)
            .min_by_key(|(_, (lower, upper))| upper - lower)
            .map(|(index, _)| index);

        match branch {
            None => {
                let values: Vec<f64> = domains.iter().map(|&(value, _)| value as f64).collect();
                Ok(u64::from(self.model.check_assignment(&values, self.tolerance).is_ok()))
            }
            Some(index) => {
                let (lower, upper) = domains[index];
                let mut total: u64 = 0;
                for value in lower..=upper {
                    let mut child = domains.clone();
                    child[index] = (value, value);
                    total = total
                        .checked_add(self.explore(child)?)
                        .ok_or(SolverError::CountOverflow)?;
                    if self.interrupted {
                        break;
                    }
                }
                Ok(total)
            }
        }
    }

    /// Tighten domains against every row until nothing changes.
    /// Returns `false` when some row can no longer be satisfied.
    fn propagate(&self, domains: &mut [Domain]) -> bool {
        let tol = self.tolerance;
        loop {
            let mut changed = false;
            for row in &self.rows {
                let (min_activity, max_activity) = row.terms.iter().fold(
                    (0.0_f64, 0.0_f64),
                    |(lo, hi), &(index, coefficient)| {
                        let (l, u) = domains[index];
                        let (a, b) = (coefficient * l as f64, coefficient * u as f64);
                        (lo + a.min(b), hi + a.max(b))
                    },
                );
                if min_activity > row.upper + tol || max_activity < row.lower - tol {
                    return false;
                }

                for &(index, coefficient) in &row.terms {
                    if coefficient == 0.0 {
                        continue;
                    }
                    let (l, u) = domains[index];
                    let (a, b) = (coefficient * l as f64, coefficient * u as f64);
                    // Activity range of the rest of the row
                    let rest_min = min_activity - a.min(b);
                    let rest_max = max_activity - a.max(b);

                    // coefficient * x must lie in [row.lower - rest_max, row.upper - rest_min]
                    let span_lo = row.lower - rest_max;
                    let span_hi = row.upper - rest_min;
                    let (mut x_lo, mut x_hi) = if coefficient > 0.0 {
                        (span_lo / coefficient, span_hi / coefficient)
                    } else {
                        (span_hi / coefficient, span_lo / coefficient)
                    };
                    if x_lo.is_nan() {
                        x_lo = f64::NEG_INFINITY;
                    }
                    if x_hi.is_nan() {
                        x_hi = f64::INFINITY;
                    }

                    let new_l = if x_lo.is_finite() {
                        l.max((x_lo - tol).ceil() as i64)
                    } else {
                        l
                    };
                    let new_u = if x_hi.is_finite() {
                        u.min((x_hi + tol).floor() as i64)
                    } else {
                        u
                    };
                    if new_l > new_u {
                        return false;
                    }
                    if (new_l, new_u) != (l, u) {
                        domains[index] = (new_l, new_u);
                        changed = true;
                    }
                }
                if changed {
                    // Activities are stale once a domain moved
                    break;
                }
            }
            if !changed {
                return true;
            }
        }
    }
}
