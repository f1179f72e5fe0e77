//! In-memory linear model.

use super::expr::{Comparator, LinearConstraint, LinearExpr, Sense};
use super::solver::ModelBuilder;
use super::variables::{VarId, VarInfo, VarKind};

/// Objective function of a [`LinearModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub expr: LinearExpr,
    pub sense: Sense,
}

/// A recorded integer linear model.
///
/// Implements [`ModelBuilder`] by storing everything it is given. Backends
/// that need the whole model up front (the bundled search, LP export)
/// work from this record.
///
/// # Examples
///
/// ```
/// use u_transync::model::{Comparator, LinearExpr, LinearModel, ModelBuilder, Sense};
///
/// let mut model = LinearModel::new("example");
/// let x = model.int_var("x", 0, 10);
/// let y = model.bool_var("y");
/// model.add_constraint(LinearExpr::var(x).term(y, -10), Comparator::Le, 0);
/// model.set_objective(LinearExpr::var(x), Sense::Maximize);
/// assert!(model.validate().is_ok());
/// assert_eq!(model.var_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    /// Model name.
    pub name: String,
    vars: Vec<VarInfo>,
    constraints: Vec<LinearConstraint>,
    objective: Option<Objective>,
}

impl LinearModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Variables in creation order.
    pub fn vars(&self) -> &[VarInfo] {
        &self.vars
    }

    /// Metadata for `var`.
    pub fn var(&self, var: VarId) -> Option<&VarInfo> {
        self.vars.get(var.index())
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Returns the number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of boolean variables.
    pub fn bool_count(&self) -> usize {
        self.vars
            .iter()
            .filter(|v| v.kind == VarKind::Boolean)
            .count()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Checks every assignment in `values` against bounds and constraints.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let in_bounds = self
            .vars
            .iter()
            .zip(values)
            .all(|(v, &x)| v.lb <= x && x <= v.ub);
        in_bounds
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(|v| values[v.index()]))
    }

    /// Validates the model for consistency.
    ///
    /// Checks variable bounds and that every referenced handle exists.
    pub fn validate(&self) -> Result<(), String> {
        for v in &self.vars {
            if v.lb > v.ub {
                return Err(format!("variable {}: empty domain [{}, {}]", v.name, v.lb, v.ub));
            }
            if v.kind == VarKind::Boolean && (v.lb < 0 || v.ub > 1) {
                return Err(format!("boolean variable {} has bounds outside [0, 1]", v.name));
            }
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if let Some(&(var, _)) = c.expr.terms().iter().find(|(v, _)| v.index() >= self.vars.len()) {
                return Err(format!("constraint {i}: undefined variable {var}"));
            }
        }
        if let Some(obj) = &self.objective {
            if let Some(&(var, _)) = obj.expr.terms().iter().find(|(v, _)| v.index() >= self.vars.len()) {
                return Err(format!("objective: undefined variable {var}"));
            }
        }
        Ok(())
    }
}

impl ModelBuilder for LinearModel {
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> VarId {
        self.vars.push(VarInfo::integer(name, lb, ub));
        VarId(self.vars.len() - 1)
    }

    fn bool_var(&mut self, name: &str) -> VarId {
        self.vars.push(VarInfo::boolean(name));
        VarId(self.vars.len() - 1)
    }

    fn add_constraint(&mut self, expr: LinearExpr, cmp: Comparator, rhs: i64) {
        self.constraints.push(LinearConstraint { expr, cmp, rhs });
    }

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.objective = Some(Objective { expr, sense });
    }
}
