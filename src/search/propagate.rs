//! Bounds propagation over linear rows.

use crate::model::{Comparator, LinearModel};
use std::collections::VecDeque;

/// Current `[lb, ub]` of every variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Domains {
    pub lb: Vec<i64>,
    pub ub: Vec<i64>,
}

impl Domains {
    pub fn from_model(model: &LinearModel) -> Self {
        Self {
            lb: model.vars().iter().map(|v| v.lb).collect(),
            ub: model.vars().iter().map(|v| v.ub).collect(),
        }
    }

    pub fn is_fixed(&self, var: usize) -> bool {
        self.lb[var] == self.ub[var]
    }

    pub fn size(&self, var: usize) -> i64 {
        self.ub[var] - self.lb[var] + 1
    }
}

/// `sum(coef * var) <= rhs`.
#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(usize, i64)>,
    rhs: i128,
}

impl Row {
    fn min_activity(&self, dom: &Domains) -> i128 {
        self.terms
            .iter()
            .map(|&(v, a)| {
                let bound = if a > 0 { dom.lb[v] } else { dom.ub[v] };
                a as i128 * bound as i128
            })
            .sum()
    }
}

/// Row store with per-variable watch lists.
#[derive(Debug, Clone)]
pub(crate) struct Propagator {
    rows: Vec<Row>,
    watches: Vec<Vec<usize>>,
}

impl Propagator {
    /// Converts every constraint of `model` into `<=` rows.
    pub fn new(model: &LinearModel) -> Self {
        let mut prop = Self {
            rows: Vec::with_capacity(model.constraint_count()),
            watches: vec![Vec::new(); model.var_count()],
        };
        for c in model.constraints() {
            let expr = c.expr.normalized();
            let terms: Vec<(usize, i64)> = expr.terms().iter().map(|&(v, a)| (v.index(), a)).collect();
            let rhs = c.rhs as i128 - expr.constant() as i128;
            if matches!(c.cmp, Comparator::Le | Comparator::Eq) {
                prop.add_row(terms.clone(), rhs);
            }
            if matches!(c.cmp, Comparator::Ge | Comparator::Eq) {
                prop.add_row(terms.iter().map(|&(v, a)| (v, -a)).collect(), -rhs);
            }
        }
        prop
    }

    /// Adds a row and returns its index.
    pub fn add_row(&mut self, terms: Vec<(usize, i64)>, rhs: i128) -> usize {
        let idx = self.rows.len();
        for &(v, _) in &terms {
            self.watches[v].push(idx);
        }
        self.rows.push(Row { terms, rhs });
        idx
    }

    pub fn set_rhs(&mut self, row: usize, rhs: i128) {
        self.rows[row].rhs = rhs;
    }

    /// Whether `row` can still be satisfied within `dom`.
    pub fn row_feasible(&self, row: usize, dom: &Domains) -> bool {
        let r = &self.rows[row];
        r.min_activity(dom) <= r.rhs
    }

    /// Propagates every row to fix point. Returns `false` on a wipe-out.
    pub fn propagate_all(&self, dom: &mut Domains) -> bool {
        self.run(dom, (0..self.rows.len()).collect())
    }

    /// Propagates the rows watching `changed`. Returns `false` on a wipe-out.
    pub fn propagate_from(&self, dom: &mut Domains, changed: usize) -> bool {
        self.run(dom, self.watches[changed].iter().copied().collect())
    }

    fn run(&self, dom: &mut Domains, mut queue: VecDeque<usize>) -> bool {
        let mut queued = vec![false; self.rows.len()];
        for &r in &queue {
            queued[r] = true;
        }

        while let Some(r) = queue.pop_front() {
            queued[r] = false;
            let row = &self.rows[r];
            let min_act = row.min_activity(dom);
            if min_act > row.rhs {
                return false;
            }

            for &(v, a) in &row.terms {
                let a128 = a as i128;
                let changed = if a > 0 {
                    let rest = min_act - a128 * dom.lb[v] as i128;
                    let bound = (row.rhs - rest).div_euclid(a128);
                    if bound < dom.ub[v] as i128 {
                        dom.ub[v] = bound as i64;
                        true
                    } else {
                        false
                    }
                } else {
                    let rest = min_act - a128 * dom.ub[v] as i128;
                    let bound = -(row.rhs - rest).div_euclid(-a128);
                    if bound > dom.lb[v] as i128 {
                        dom.lb[v] = bound as i64;
                        true
                    } else {
                        false
                    }
                };

                if changed {
                    if dom.lb[v] > dom.ub[v] {
                        return false;
                    }
                    for &w in &self.watches[v] {
                        if w != r && !queued[w] {
                            queued[w] = true;
                            queue.push_back(w);
                        }
                    }
                }
            }
        }
        true
    }
}
