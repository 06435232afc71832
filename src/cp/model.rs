//! 0-1 model: variables, linear constraints, objective.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// A boolean decision variable (index into its model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(u32);

impl BoolVar {
    /// Position of this variable in the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Weighted sum of boolean variables: Σ cᵢ·xᵢ.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(BoolVar, i64)>,
}

impl LinearExpr {
    /// Empty expression (constant 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit-coefficient sum of the given variables.
    pub fn sum<I: IntoIterator<Item = BoolVar>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Adds `coef · var`.
    pub fn add_term(&mut self, var: BoolVar, coef: i64) {
        self.terms.push((var, coef));
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: BoolVar, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// The (variable, coefficient) terms.
    pub fn terms(&self) -> &[(BoolVar, i64)] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Smallest value the expression can take (sum of negative coefficients).
    pub fn min_activity(&self) -> i64 {
        self.terms.iter().map(|&(_, c)| c.min(0)).sum()
    }

    /// Largest value the expression can take (sum of positive coefficients).
    pub fn max_activity(&self) -> i64 {
        self.terms.iter().map(|&(_, c)| c.max(0)).sum()
    }

    /// Evaluates the expression under a full assignment.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(v, _)| values[v.index()])
            .map(|(_, c)| c)
            .sum()
    }
}

/// How a constraint was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// General `lo ≤ expr ≤ hi`.
    Linear,
    /// Exactly one of the listed variables is true.
    ExactlyOne,
    /// At most one of the listed variables is true.
    AtMostOne,
}

/// `lo ≤ Σ cᵢ·xᵢ ≤ hi`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub(crate) expr: LinearExpr,
    pub(crate) lo: i64,
    pub(crate) hi: i64,
    pub(crate) kind: ConstraintKind,
}

impl LinearConstraint {
    /// Constrained expression.
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    /// Inclusive bounds.
    pub fn bounds(&self) -> (i64, i64) {
        (self.lo, self.hi)
    }

    /// Declaration kind.
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Whether a full assignment satisfies this constraint.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let activity = self.expr.evaluate(values);
        activity >= self.lo && activity <= self.hi
    }
}

/// Optimization objective.
#[derive(Debug, Clone, Default)]
pub enum Objective {
    /// Any feasible assignment is optimal.
    #[default]
    Satisfy,
    /// Minimize `max(exprs) − min(exprs)`.
    ///
    /// `lower_bound` is a value no feasible solution can beat; a solution
    /// that reaches it is optimal.
    MinimizeSpread {
        exprs: Vec<LinearExpr>,
        lower_bound: i64,
    },
}

impl Objective {
    /// Value no solution can beat (0 for `Satisfy`).
    pub fn lower_bound(&self) -> i64 {
        match self {
            Self::Satisfy => 0,
            Self::MinimizeSpread { lower_bound, .. } => *lower_bound,
        }
    }

    /// Objective value under a full assignment (0 for `Satisfy`).
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        match self {
            Self::Satisfy => 0,
            Self::MinimizeSpread { exprs, .. } => {
                let loads: Vec<i64> = exprs.iter().map(|e| e.evaluate(values)).collect();
                let max = loads.iter().copied().max().unwrap_or(0);
                let min = loads.iter().copied().min().unwrap_or(0);
                max - min
            }
        }
    }
}

/// Structural problem in a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("constraint {constraint} references unknown variable {var}")]
    UnknownVariable { constraint: usize, var: usize },

    #[error("constraint {constraint} lists variable {var} more than once")]
    DuplicateVariable { constraint: usize, var: usize },

    #[error("constraint {constraint} has empty range [{lo}, {hi}]")]
    EmptyRange { constraint: usize, lo: i64, hi: i64 },

    #[error("spread objective has no expressions")]
    EmptyObjective,

    #[error("objective references unknown variable {var}")]
    UnknownObjectiveVariable { var: usize },
}

/// A 0-1 linear model, independent of the solver that runs it.
///
/// # Example
/// ```
/// use u_timetable::cp::{CpModel, LinearExpr};
///
/// let mut model = CpModel::new("demo");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// let w = model.new_bool_var("w");
/// model.add_exactly_one([a, b]);
/// // w == a
/// model.add_equality(LinearExpr::sum([a]).with_term(w, -1), 0);
/// assert_eq!(model.constraint_count(), 2);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    constraints: Vec<LinearConstraint>,
    objective: Objective,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_names: Vec::new(),
            constraints: Vec::new(),
            objective: Objective::Satisfy,
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        let var = BoolVar(self.var_names.len() as u32);
        self.var_names.push(name.into());
        var
    }

    /// Name of a variable.
    pub fn var_name(&self, var: BoolVar) -> Option<&str> {
        self.var_names.get(var.index()).map(String::as_str)
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// All constraints in declaration order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// The objective.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    fn push(&mut self, expr: LinearExpr, lo: i64, hi: i64, kind: ConstraintKind) {
        self.constraints.push(LinearConstraint { expr, lo, hi, kind });
    }

    /// Adds `lo ≤ expr ≤ hi`.
    pub fn add_linear(&mut self, expr: LinearExpr, lo: i64, hi: i64) {
        self.push(expr, lo, hi, ConstraintKind::Linear)
    }

    /// Adds `expr == value`.
    pub fn add_equality(&mut self, expr: LinearExpr, value: i64) {
        self.add_linear(expr, value, value)
    }

    /// Adds `expr ≤ ub`.
    pub fn add_less_or_equal(&mut self, expr: LinearExpr, ub: i64) {
        self.add_linear(expr, i64::MIN, ub)
    }

    /// Adds `expr ≥ lb`.
    pub fn add_greater_or_equal(&mut self, expr: LinearExpr, lb: i64) {
        self.add_linear(expr, lb, i64::MAX)
    }

    /// Exactly one of `vars` is true.
    pub fn add_exactly_one<I: IntoIterator<Item = BoolVar>>(&mut self, vars: I) {
        self.push(LinearExpr::sum(vars), 1, 1, ConstraintKind::ExactlyOne)
    }

    /// At most one of `vars` is true.
    pub fn add_at_most_one<I: IntoIterator<Item = BoolVar>>(&mut self, vars: I) {
        self.push(LinearExpr::sum(vars), 0, 1, ConstraintKind::AtMostOne)
    }

    /// Minimize `max(exprs) − min(exprs)`; no solution scores below `lower_bound`.
    pub fn minimize_spread(&mut self, exprs: Vec<LinearExpr>, lower_bound: i64) {
        self.objective = Objective::MinimizeSpread {
            exprs,
            lower_bound: lower_bound.max(0),
        };
    }

    /// Checks structural integrity.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.var_count();
        let mut seen = HashSet::new();
        for (ci, con) in self.constraints.iter().enumerate() {
            if con.lo > con.hi {
                return Err(ModelError::EmptyRange {
                    constraint: ci,
                    lo: con.lo,
                    hi: con.hi,
                });
            }
            seen.clear();
            for &(var, _) in con.expr.terms() {
                if var.index() >= n {
                    return Err(ModelError::UnknownVariable {
                        constraint: ci,
                        var: var.index(),
                    });
                }
                if !seen.insert(var) {
                    return Err(ModelError::DuplicateVariable {
                        constraint: ci,
                        var: var.index(),
                    });
                }
            }
        }
        if let Objective::MinimizeSpread { exprs, .. } = &self.objective {
            if exprs.is_empty() {
                return Err(ModelError::EmptyObjective);
            }
            for expr in exprs {
                if let Some(&(var, _)) = expr.terms().iter().find(|(v, _)| v.index() >= n) {
                    return Err(ModelError::UnknownObjectiveVariable { var: var.index() });
                }
            }
        }
        Ok(())
    }

    /// Whether a full assignment satisfies every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.var_count() && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

impl fmt::Display for CpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} vars, {} constraints)",
            self.name,
            self.var_count(),
            self.constraint_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_bounds() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let expr = LinearExpr::sum([a]).with_term(b, -3);
        assert_eq!(expr.min_activity(), -3);
        assert_eq!(expr.max_activity(), 1);
        assert_eq!(model.var_name(b), Some("b"));
    }

    #[test]
    fn test_constraint_satisfaction() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let w = model.new_bool_var("w");
        model.add_at_most_one([a, b]);
        // w is set exactly when a or b is.
        model.add_equality(LinearExpr::sum([a, b]).with_term(w, -1), 0);

        assert!(model.is_feasible(&[true, false, true]));
        assert!(!model.is_feasible(&[true, true, true]));
        assert!(!model.is_feasible(&[false, false, true]));
        assert!(!model.is_feasible(&[false, true, false]));
        assert!(model.is_feasible(&[false, false, false]));
    }

    #[test]
    fn test_validate_duplicate_variable() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a");
        model.add_linear(LinearExpr::sum([a, a]), 0, 1);
        assert_eq!(
            model.validate(),
            Err(ModelError::DuplicateVariable {
                constraint: 0,
                var: 0
            })
        );
    }

    #[test]
    fn test_validate_empty_range() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a");
        model.add_linear(LinearExpr::sum([a]), 2, 1);
        assert!(matches!(model.validate(), Err(ModelError::EmptyRange { .. })));
    }

    #[test]
    fn test_validate_empty_objective() {
        let mut model = CpModel::new("m");
        model.minimize_spread(Vec::new(), 0);
        assert_eq!(model.validate(), Err(ModelError::EmptyObjective));
    }

    #[test]
    fn test_spread_evaluation() {
        let mut model = CpModel::new("m");
        let vars: Vec<BoolVar> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        let objective = Objective::MinimizeSpread {
            exprs: vec![
                LinearExpr::sum([vars[0], vars[1]]),
                LinearExpr::sum([vars[2], vars[3]]),
            ],
            lower_bound: 0,
        };
        assert_eq!(objective.evaluate(&[true, true, false, false]), 2);
        assert_eq!(objective.evaluate(&[true, false, true, false]), 0);
    }
}
