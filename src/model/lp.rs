//! CPLEX LP text export.
//!
//! Lets a recorded model be handed to any external MILP engine that reads
//! LP files (SCIP, CBC, HiGHS, Gurobi). Running that engine and reading
//! its solution back is left to the caller.

use super::expr::{LinearExpr, Sense};
use super::model::LinearModel;
use super::solver::SolverError;
use super::variables::VarKind;
use std::fmt::Write as _;
use std::io;

/// Terms per physical line; LP readers cap line length.
const TERMS_PER_LINE: usize = 8;

/// Column fixed at 0 that carries rows without variables, so an
/// unsatisfiable constant row stays unsatisfiable in the export.
const ZERO_COLUMN: &str = "const_zero";

impl LinearModel {
    /// Renders the model in CPLEX LP format.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_transync::model::{Comparator, LinearExpr, LinearModel, ModelBuilder, Sense};
    ///
    /// let mut model = LinearModel::new("tiny");
    /// let x = model.int_var("x", 0, 10);
    /// model.add_constraint(LinearExpr::var(x), Comparator::Ge, 2);
    /// model.set_objective(LinearExpr::var(x), Sense::Minimize);
    ///
    /// let lp = model.to_lp_string();
    /// assert!(lp.contains("Minimize"));
    /// assert!(lp.contains(" c0: + 1 x >= 2"));
    /// ```
    pub fn to_lp_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\ Problem: {}", self.name);

        match self.objective() {
            Some(obj) => {
                let header = match obj.sense {
                    Sense::Maximize => "Maximize",
                    Sense::Minimize => "Minimize",
                };
                let _ = writeln!(out, "{header}");
                out.push_str(" obj:");
                if obj.expr.is_constant() {
                    let _ = write!(out, " {}", obj.expr.constant());
                } else {
                    self.push_terms(&mut out, &obj.expr);
                    if obj.expr.constant() != 0 {
                        let _ = write!(out, " {:+}", obj.expr.constant());
                    }
                }
                out.push('\n');
            }
            None => out.push_str("Minimize\n obj: 0\n"),
        }

        out.push_str("Subject To\n");
        let mut zero_column = false;
        for (i, c) in self.constraints().iter().enumerate() {
            let rhs = c.rhs - c.expr.constant();
            let _ = write!(out, " c{i}:");
            if c.expr.normalized().is_constant() {
                zero_column = true;
                let _ = write!(out, " + 1 {ZERO_COLUMN}");
            } else {
                self.push_terms(&mut out, &c.expr);
            }
            let _ = writeln!(out, " {} {rhs}", c.cmp.symbol());
        }

        out.push_str("Bounds\n");
        if zero_column {
            let _ = writeln!(out, " {ZERO_COLUMN} = 0");
        }
        for v in self.vars().iter().filter(|v| v.kind == VarKind::Integer) {
            if v.is_fixed() {
                let _ = writeln!(out, " {} = {}", v.name, v.lb);
            } else {
                let _ = writeln!(out, " {} <= {} <= {}", v.lb, v.name, v.ub);
            }
        }

        self.push_section(&mut out, "Generals", VarKind::Integer);
        self.push_section(&mut out, "Binaries", VarKind::Boolean);
        out.push_str("End\n");
        out
    }

    /// Writes the LP rendering to `writer`.
    ///
    /// Write failures surface as [`SolverError::Io`], the same error an
    /// LP-file backend reports when handing the model to its engine.
    pub fn write_lp<W: io::Write>(&self, mut writer: W) -> Result<(), SolverError> {
        writer.write_all(self.to_lp_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn push_terms(&self, out: &mut String, expr: &LinearExpr) {
        for (n, &(var, coef)) in expr.normalized().terms().iter().enumerate() {
            if n > 0 && n % TERMS_PER_LINE == 0 {
                out.push_str("\n   ");
            }
            let sign = if coef < 0 { '-' } else { '+' };
            let name = self.var(var).map(|v| v.name.as_str()).unwrap_or("?");
            let _ = write!(out, " {sign} {} {name}", coef.abs());
        }
    }

    fn push_section(&self, out: &mut String, header: &str, kind: VarKind) {
        let names: Vec<&str> = self
            .vars()
            .iter()
            .filter(|v| v.kind == kind)
            .map(|v| v.name.as_str())
            .collect();
        if names.is_empty() {
            return;
        }
        let _ = writeln!(out, "{header}");
        for chunk in names.chunks(TERMS_PER_LINE) {
            let _ = writeln!(out, " {}", chunk.join(" "));
        }
    }
}
