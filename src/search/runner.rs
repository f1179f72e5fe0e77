//! Depth-first branch & bound backend.

use super::config::SearchConfig;
use super::propagate::{Domains, Propagator};
use crate::model::{
    Comparator, LinearExpr, LinearModel, ModelBuilder, Sense, SolveStatus, Solution,
    SolverBackend, SolverError, VarId, VarKind,
};
use std::time::{Duration, Instant};
use tracing::debug;

/// Nodes between two wall-clock checks.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Exact backend bundled with the crate.
///
/// Records the model through [`ModelBuilder`], then runs a depth-first
/// branch & bound: bounds propagation to fix point at every node,
/// branching in variable-creation order, values ordered by objective
/// direction and an objective cut tightened after each incumbent.
///
/// Intended for small and medium networks; large instances should go to
/// an industrial MILP engine through another [`SolverBackend`] adapter or
/// through [`LinearModel::to_lp_string`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_transync::model::{Comparator, LinearExpr, ModelBuilder, Sense, SolveStatus, SolverBackend};
/// use u_transync::search::DfsSolver;
///
/// let mut solver = DfsSolver::new();
/// let x = solver.int_var("x", 0, 10);
/// let y = solver.int_var("y", 0, 10);
/// solver.add_constraint(LinearExpr::var(x).term(y, 2), Comparator::Le, 14);
/// solver.set_objective(LinearExpr::var(x).term(y, 3), Sense::Maximize);
///
/// let solution = solver.solve(Duration::from_secs(5)).unwrap();
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(21));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DfsSolver {
    model: LinearModel,
    config: SearchConfig,
}

impl DfsSolver {
    /// Creates a solver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with the given configuration.
    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            model: LinearModel::new("model"),
            config,
        }
    }

    /// The model recorded so far.
    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Consumes the solver, returning the recorded model.
    pub fn into_model(self) -> LinearModel {
        self.model
    }
}

impl ModelBuilder for DfsSolver {
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> VarId {
        self.model.int_var(name, lb, ub)
    }

    fn bool_var(&mut self, name: &str) -> VarId {
        self.model.bool_var(name)
    }

    fn add_constraint(&mut self, expr: LinearExpr, cmp: Comparator, rhs: i64) {
        self.model.add_constraint(expr, cmp, rhs);
    }

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.model.set_objective(expr, sense);
    }
}

impl SolverBackend for DfsSolver {
    fn name(&self) -> &str {
        "dfs"
    }

    fn solve(&mut self, time_budget: Duration) -> Result<Solution, SolverError> {
        self.config.validate().map_err(SolverError::InvalidModel)?;
        self.model.validate().map_err(SolverError::InvalidModel)?;

        let start = Instant::now();
        let mut search = Search::new(&self.model, &self.config, start + time_budget);
        let status = search.run();
        let elapsed = start.elapsed();

        debug!(
            model = %self.model.name,
            vars = self.model.var_count(),
            constraints = self.model.constraint_count(),
            nodes = search.nodes,
            ?status,
            elapsed_ms = elapsed.as_millis() as u64,
            "dfs search finished"
        );

        Ok(match search.incumbent {
            Some(values) if status.has_solution() => {
                let objective_value = self
                    .model
                    .objective()
                    .map(|obj| obj.expr.eval(|v| values[v.index()]))
                    .unwrap_or(0);
                Solution::new(status, Some(objective_value), values, elapsed)
            }
            _ => Solution::new(status, None, Vec::new(), elapsed),
        })
    }
}

/// State of one search run.
struct Search<'a> {
    model: &'a LinearModel,
    config: &'a SearchConfig,
    prop: Propagator,
    /// Objective in minimization form, `None` when there is no objective.
    objective: Option<Vec<(usize, i64)>>,
    /// Per-variable minimization-form objective coefficient.
    coef: Vec<i64>,
    cut_row: Option<usize>,
    incumbent: Option<Vec<i64>>,
    deadline: Instant,
    nodes: u64,
    stopped: bool,
    done: bool,
}

impl<'a> Search<'a> {
    fn new(model: &'a LinearModel, config: &'a SearchConfig, deadline: Instant) -> Self {
        let mut prop = Propagator::new(model);
        let mut coef = vec![0; model.var_count()];

        let objective = model.objective().and_then(|obj| {
            let sign = match obj.sense {
                Sense::Minimize => 1,
                Sense::Maximize => -1,
            };
            let terms: Vec<(usize, i64)> = obj
                .expr
                .normalized()
                .terms()
                .iter()
                .map(|&(v, c)| (v.index(), sign * c))
                .collect();
            (!terms.is_empty()).then_some(terms)
        });

        let cut_row = objective.as_ref().map(|terms| {
            for &(v, c) in terms {
                coef[v] = c;
            }
            prop.add_row(terms.clone(), i128::MAX / 4)
        });

        Self {
            model,
            config,
            prop,
            objective,
            coef,
            cut_row,
            incumbent: None,
            deadline,
            nodes: 0,
            stopped: false,
            done: false,
        }
    }

    fn run(&mut self) -> SolveStatus {
        let mut dom = Domains::from_model(self.model);
        if self.prop.propagate_all(&mut dom) {
            self.dfs(dom, 0);
        }

        match (&self.incumbent, self.stopped) {
            (Some(_), false) => SolveStatus::Optimal,
            (Some(_), true) => SolveStatus::Feasible,
            (None, false) => SolveStatus::Infeasible,
            (None, true) => SolveStatus::Unknown,
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped || self.done {
            return true;
        }
        if self.config.node_limit.is_some_and(|limit| self.nodes >= limit)
            || (self.nodes % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline)
        {
            self.stopped = true;
        }
        self.stopped
    }

    fn dfs(&mut self, dom: Domains, from: usize) {
        if self.should_stop() {
            return;
        }
        self.nodes += 1;

        if let Some(cut) = self.cut_row {
            if !self.prop.row_feasible(cut, &dom) {
                return;
            }
        }

        let Some(var) = (from..dom.lb.len()).find(|&v| !dom.is_fixed(v)) else {
            self.record(dom);
            return;
        };

        for (lb, ub) in self.branches(var, &dom) {
            let mut child = dom.clone();
            child.lb[var] = lb;
            child.ub[var] = ub;
            if self.prop.propagate_from(&mut child, var) {
                self.dfs(child, var);
            }
            if self.stopped || self.done {
                return;
            }
        }
    }

    /// Child domains of `var`, best objective direction first.
    fn branches(&self, var: usize, dom: &Domains) -> Vec<(i64, i64)> {
        let (lb, ub) = (dom.lb[var], dom.ub[var]);
        let descending = match self.coef[var] {
            c if c < 0 => true,
            c if c > 0 => false,
            _ => self.model.vars()[var].kind == VarKind::Boolean,
        };

        let mut children: Vec<(i64, i64)> = if dom.size(var) > self.config.split_threshold {
            let mid = lb + (ub - lb) / 2;
            vec![(lb, mid), (mid + 1, ub)]
        } else {
            (lb..=ub).map(|x| (x, x)).collect()
        };
        if descending {
            children.reverse();
        }
        children
    }

    fn record(&mut self, dom: Domains) {
        let values = dom.lb;
        debug_assert!(self.model.is_feasible(&values));

        match (&self.objective, self.cut_row) {
            (Some(terms), Some(cut)) => {
                let value: i128 = terms
                    .iter()
                    .map(|&(v, c)| c as i128 * values[v] as i128)
                    .sum();
                self.prop.set_rhs(cut, value - 1);
                self.incumbent = Some(values);
                if self.config.stop_after_first {
                    self.stopped = true;
                }
            }
            _ => {
                // any feasible point is optimal without an objective
                self.incumbent = Some(values);
                self.done = true;
            }
        }
    }
}
