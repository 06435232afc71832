//! 0-1 constraint models and their solver.
//!
//! - [`CpModel`]: boolean variables, linear constraints over them, and a
//!   spread-minimizing objective. Solver independent.
//! - [`CpSolver`]: the solving seam. [`HighsSolver`] formulates the model
//!   as a MILP with `good_lp` and runs HiGHS, bounded by wall-clock time
//!   and thread count.
//!
//! Status codes follow the usual CP-solver convention
//! (OPTIMAL / FEASIBLE / INFEASIBLE / MODEL_INVALID / UNKNOWN).
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming"
//! - Huangfu & Hall (2018), "Parallelizing the dual revised simplex method"

mod highs;
mod model;
mod solver;

pub use highs::HighsSolver;
pub use model::{BoolVar, ConstraintKind, CpModel, LinearConstraint, LinearExpr, ModelError, Objective};
pub use solver::{CpSolution, CpSolver, SolveStatus, SolverConfig, SolverStats};
