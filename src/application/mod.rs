// Application layer: the public modeling API (solver lifecycle, builders, solutions)

pub mod constraint;
pub mod solution;
pub mod solver;

pub use constraint::Constraint;
pub use solution::Solution;
pub use solver::Solver;
