//! Linear expressions and constraint comparators.

use super::variables::VarId;
use std::collections::BTreeMap;

/// A linear expression `sum(coef * var) + constant` with integer coefficients.
///
/// # Examples
///
/// ```
/// use u_transync::model::{LinearExpr, LinearModel, ModelBuilder};
///
/// let mut model = LinearModel::new("demo");
/// let x = model.int_var("x", 0, 10);
/// let y = model.bool_var("y");
/// let expr = LinearExpr::var(x).term(y, -3).plus(4);
/// assert_eq!(expr.eval(|v| if v == x { 5 } else { 1 }), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// The empty expression (zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn from_constant(constant: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// A single variable with coefficient 1.
    pub fn var(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1)],
            constant: 0,
        }
    }

    /// Adds `coef * var`.
    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds a constant.
    pub fn plus(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    pub fn add_constant(&mut self, constant: i64) {
        self.constant += constant;
    }

    /// The `(variable, coefficient)` terms, in insertion order.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// The constant part.
    pub fn constant(&self) -> i64 {
        self.constant
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression under an assignment.
    pub fn eval(&self, value: impl Fn(VarId) -> i64) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * value(v))
            .sum::<i64>()
            + self.constant
    }

    /// Merges repeated variables and drops zero coefficients.
    pub fn normalized(&self) -> Self {
        let mut merged: BTreeMap<VarId, i64> = BTreeMap::new();
        for &(v, c) in &self.terms {
            *merged.entry(v).or_insert(0) += c;
        }
        Self {
            terms: merged.into_iter().filter(|&(_, c)| c != 0).collect(),
            constant: self.constant,
        }
    }
}

impl FromIterator<(VarId, i64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, i64)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (v, c) in iter {
            expr.add_term(v, c);
        }
        expr
    }
}

/// Relation between an expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `expr <= rhs`
    Le,
    /// `expr == rhs`
    Eq,
    /// `expr >= rhs`
    Ge,
}

impl Comparator {
    /// LP-format operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Le => "<=",
            Comparator::Eq => "=",
            Comparator::Ge => ">=",
        }
    }

    /// Whether `lhs (op) rhs` holds.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::Le => lhs <= rhs,
            Comparator::Eq => lhs == rhs,
            Comparator::Ge => lhs >= rhs,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    Maximize,
    Minimize,
}

/// A linear constraint `expr (cmp) rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub cmp: Comparator,
    pub rhs: i64,
}

impl LinearConstraint {
    /// Whether the constraint holds under an assignment.
    pub fn is_satisfied(&self, value: impl Fn(VarId) -> i64) -> bool {
        self.cmp.holds(self.expr.eval(value), self.rhs)
    }
}
