//! Solver backend contract.

use super::expr::{Comparator, LinearExpr, Sense};
use super::variables::VarId;
use std::time::Duration;

/// Status reported by a backend after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not proven optimal) solution found, typically because
    /// the time budget ran out.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Search stopped without a solution and without an infeasibility proof.
    Unknown,
}

impl SolveStatus {
    /// Whether the status comes with variable values.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Result of one backend solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solver status.
    pub status: SolveStatus,
    /// Objective value, present whenever `status` has a solution.
    pub objective_value: Option<i64>,
    /// Wall-clock time spent in the backend.
    pub elapsed: Duration,
    values: Vec<i64>,
}

impl Solution {
    /// Creates a solution with values indexed by [`VarId`].
    pub fn new(
        status: SolveStatus,
        objective_value: Option<i64>,
        values: Vec<i64>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            objective_value,
            elapsed,
            values,
        }
    }

    /// Creates a value-less solution with the given status.
    pub fn empty(status: SolveStatus) -> Self {
        Self::new(status, None, Vec::new(), Duration::ZERO)
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    /// Value assigned to `var`, if any.
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied()
    }

    /// Value assigned to `var`, or [`SolverError::UnknownVariable`] when the
    /// backend returned fewer values than the model has variables.
    pub fn require(&self, var: VarId) -> Result<i64, SolverError> {
        self.value(var).ok_or(SolverError::UnknownVariable(var))
    }

    /// Whether boolean `var` is set.
    pub fn is_true(&self, var: VarId) -> bool {
        self.value(var) == Some(1)
    }
}

/// Backend or transport failure. Never a modelling outcome: infeasibility
/// and budget exhaustion are reported through [`SolveStatus`].
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("unknown variable handle {0}")]
    UnknownVariable(VarId),

    #[error("{backend} backend failed: {message}")]
    Backend { backend: String, message: String },

    #[error("I/O error talking to backend: {0}")]
    Io(#[from] std::io::Error),
}

/// Model-construction half of the backend contract.
///
/// The synchronization builder is written once against this trait; every
/// concrete engine only needs a thin adapter.
pub trait ModelBuilder {
    /// Creates an integer variable in `[lb, ub]`.
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> VarId;

    /// Creates a 0/1 variable.
    fn bool_var(&mut self, name: &str) -> VarId;

    /// Adds `expr (cmp) rhs`.
    fn add_constraint(&mut self, expr: LinearExpr, cmp: Comparator, rhs: i64);

    /// Sets (replaces) the objective.
    fn set_objective(&mut self, expr: LinearExpr, sense: Sense);
}

/// A solver that can run the model it was given.
///
/// Each instance is used for exactly one model; callers create a fresh
/// backend per stage. `solve` is a blocking call bounded by `time_budget`;
/// when the budget runs out the backend reports [`SolveStatus::Feasible`]
/// or [`SolveStatus::Unknown`] rather than failing.
pub trait SolverBackend: ModelBuilder {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Solves the model built so far.
    fn solve(&mut self, time_budget: Duration) -> Result<Solution, SolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    #[test]
    fn test_solution_values() {
        let sol = Solution::new(
            SolveStatus::Optimal,
            Some(3),
            vec![4, 1, 0],
            Duration::from_millis(2),
        );
        assert!(sol.is_solution_found());
        assert_eq!(sol.value(VarId(0)), Some(4));
        assert!(sol.is_true(VarId(1)));
        assert!(!sol.is_true(VarId(2)));
        assert_eq!(sol.value(VarId(9)), None);
        assert_eq!(sol.require(VarId(0)).unwrap(), 4);
        assert!(matches!(
            sol.require(VarId(9)),
            Err(SolverError::UnknownVariable(VarId(9)))
        ));
    }

    #[test]
    fn test_empty_solution() {
        let sol = Solution::empty(SolveStatus::Infeasible);
        assert!(!sol.is_solution_found());
        assert!(sol.objective_value.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = SolverError::Backend {
            backend: "scip".into(),
            message: "solution file missing".into(),
        };
        assert_eq!(err.to_string(), "scip backend failed: solution file missing");
        assert_eq!(
            SolverError::UnknownVariable(VarId(3)).to_string(),
            "unknown variable handle v3"
        );
    }
}
