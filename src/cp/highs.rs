//! HiGHS backend through `good_lp`.
//!
//! # Formulation
//!
//! | Model item | MILP |
//! |------------|------|
//! | `BoolVar` | binary column |
//! | `lo ≤ expr ≤ hi` | one equality row if `lo == hi`, else one row per side the expression can violate |
//! | `MinimizeSpread` | integer columns `max_load`, `min_load` with `max_load ≥ loadᵢ`, `min_load ≤ loadᵢ`, `max_load − min_load ≥ lower_bound`; minimize `max_load − min_load` |
//!
//! The MIP gap is set to zero, so a run that ends before the time limit
//! has proven its answer.

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Constraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};
use tracing::{info, warn};

use super::model::{CpModel, LinearExpr, Objective};
use super::solver::{CpSolution, CpSolver, SolveStatus, SolverConfig, SolverStats};

/// Solves [`CpModel`]s as 0-1 integer programs with HiGHS.
///
/// # Example
/// ```
/// use u_timetable::cp::{CpModel, CpSolver, HighsSolver, SolveStatus, SolverConfig};
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one([a, b]);
///
/// let config = SolverConfig::new().with_time_limit_secs(5.0);
/// let solution = HighsSolver::new().solve(&model, &config);
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert!(solution.value(a) ^ solution.value(b));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsSolver;

impl HighsSolver {
    /// Creates a solver.
    pub fn new() -> Self {
        Self
    }
}

/// `Σ cᵢ·xᵢ` over the binary columns.
fn linear(expr: &LinearExpr, columns: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .map(|&(var, coef)| coef as f64 * columns[var.index()])
        .sum()
}

struct Formulation {
    problem: ProblemVariables,
    columns: Vec<Variable>,
    auxiliary: usize,
    objective: Expression,
    rows: Vec<Constraint>,
}

impl Formulation {
    fn new(model: &CpModel) -> Self {
        let mut problem = ProblemVariables::new();
        let columns = problem.add_vector(variable().binary(), model.var_count());

        let mut rows = Vec::with_capacity(model.constraint_count());
        for con in model.constraints() {
            let (lo, hi) = con.bounds();
            let expr = linear(con.expr(), &columns);
            if lo == hi {
                let rhs = lo as f64;
                rows.push(constraint!(expr == rhs));
                continue;
            }
            if lo > con.expr().min_activity() {
                let rhs = lo as f64;
                rows.push(constraint!(expr.clone() >= rhs));
            }
            if hi < con.expr().max_activity() {
                let rhs = hi as f64;
                rows.push(constraint!(expr <= rhs));
            }
        }

        let mut auxiliary = 0;
        let objective = match model.objective() {
            Objective::Satisfy => std::iter::empty::<Variable>().sum(),
            Objective::MinimizeSpread { exprs, lower_bound } => {
                let floor = exprs.iter().map(LinearExpr::min_activity).min().unwrap_or(0) as f64;
                let ceiling = exprs.iter().map(LinearExpr::max_activity).max().unwrap_or(0) as f64;
                let max_load = problem.add(variable().integer().min(floor).max(ceiling));
                let min_load = problem.add(variable().integer().min(floor).max(ceiling));
                auxiliary = 2;
                for expr in exprs {
                    let load = linear(expr, &columns);
                    rows.push(constraint!(max_load >= load.clone()));
                    rows.push(constraint!(min_load <= load));
                }
                let bound = *lower_bound as f64;
                rows.push(constraint!(max_load - min_load >= bound));
                max_load - min_load
            }
        };

        Self {
            problem,
            columns,
            auxiliary,
            objective,
            rows,
        }
    }
}

impl CpSolver for HighsSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let mut stats = SolverStats {
            workers: config.workers(),
            ..SolverStats::default()
        };

        if let Err(err) = model.validate() {
            warn!(event = "model_invalid", model = model.name(), error = %err);
            stats.wall_time = started.elapsed();
            return CpSolution::without_values(SolveStatus::ModelInvalid, stats);
        }
        let time_limit = config.time_limit();
        if time_limit.is_zero() {
            warn!(event = "no_time_budget", model = model.name());
            stats.wall_time = started.elapsed();
            return CpSolution::without_values(SolveStatus::Unknown, stats);
        }

        let Formulation {
            problem,
            columns,
            auxiliary,
            objective,
            rows,
        } = Formulation::new(model);
        stats.columns = columns.len() + auxiliary;
        stats.rows = rows.len();

        info!(
            event = "search_start",
            model = model.name(),
            columns = stats.columns,
            rows = stats.rows,
            workers = stats.workers,
            time_limit_secs = config.time_limit_secs,
        );

        let threads = i32::try_from(stats.workers).unwrap_or(i32::MAX);
        let seed = (config.random_seed % i32::MAX as u64) as i32;
        let mut backend = problem
            .minimise(objective)
            .using(default_solver)
            .set_option("time_limit", time_limit.as_secs_f64())
            .set_option("mip_rel_gap", 0.0)
            .set_option("threads", threads)
            .set_option("random_seed", seed)
            .set_option("output_flag", config.log_search_progress);
        for row in rows {
            backend.add_constraint(row);
        }
        let result = backend.solve();
        stats.wall_time = started.elapsed();

        let (status, values) = match result {
            Ok(solution) => {
                let values: Vec<bool> = columns.iter().map(|&c| solution.value(c) > 0.5).collect();
                if !model.is_feasible(&values) {
                    // Time limit hit before any incumbent.
                    (SolveStatus::Unknown, Vec::new())
                } else if stats.wall_time < time_limit
                    || model.objective().evaluate(&values) <= model.objective().lower_bound()
                {
                    (SolveStatus::Optimal, values)
                } else {
                    (SolveStatus::Feasible, values)
                }
            }
            Err(ResolutionError::Infeasible) => (SolveStatus::Infeasible, Vec::new()),
            Err(ResolutionError::Unbounded) => (SolveStatus::ModelInvalid, Vec::new()),
            Err(err) => {
                warn!(event = "backend_failed", model = model.name(), error = %err);
                (SolveStatus::Unknown, Vec::new())
            }
        };
        let objective = (!values.is_empty()).then(|| model.objective().evaluate(&values));

        info!(
            event = "search_end",
            model = model.name(),
            status = %status,
            objective,
            wall_time_ms = stats.wall_time.as_millis() as u64,
        );

        CpSolution {
            status,
            values,
            objective,
            stats,
        }
    }
}
