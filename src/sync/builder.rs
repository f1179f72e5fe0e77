//! Parameterized stage-model construction.

use super::config::SyncConfig;
use super::edges::{EdgeKey, EdgeSet, SyncEdge};
use crate::model::{Comparator, LinearExpr, ModelBuilder, Sense, Solution, SolverError, VarId};
use crate::network::Network;
use crate::trips::TripTable;
use std::collections::BTreeMap;
use tracing::debug;

/// Objective of one stage model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncObjective {
    /// Maximize the number of enabled edges.
    Count,
    /// Maximize the flow-weighted number of enabled edges.
    WeightedCount,
    /// Hold the weighted count at `weighted_count` and minimize the
    /// flow-weighted sum of captured slack.
    TotalImbalance { weighted_count: i64 },
    /// Hold the weighted count at `weighted_count` and minimize the
    /// largest captured slack.
    WorstWait { weighted_count: i64 },
}

impl SyncObjective {
    /// Whether the objective needs the auxiliary slack variables.
    pub fn captures_slack(&self) -> bool {
        matches!(
            self,
            SyncObjective::TotalImbalance { .. } | SyncObjective::WorstWait { .. }
        )
    }

    /// Weighted count imposed as an equality, if any.
    pub fn carried_weighted_count(&self) -> Option<i64> {
        match *self {
            SyncObjective::TotalImbalance { weighted_count }
            | SyncObjective::WorstWait { weighted_count } => Some(weighted_count),
            SyncObjective::Count | SyncObjective::WeightedCount => None,
        }
    }
}

/// Variables created for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeVars {
    /// 0/1 indicator.
    pub enabled: VarId,
    /// Slack when enabled, 0 otherwise. Only created by slack-capturing
    /// objectives.
    pub slack: Option<VarId>,
}

/// Handles to every variable of a built stage model.
#[derive(Debug, Clone, Default)]
pub struct SyncVars {
    offsets: Vec<Vec<VarId>>,
    edges: BTreeMap<EdgeKey, EdgeVars>,
    worst_wait: Option<VarId>,
    weighted_count: LinearExpr,
}

impl SyncVars {
    /// Departure offset of trip `j` of line `i`.
    ///
    /// # Panics
    ///
    /// Panics if the trip does not exist.
    pub fn offset(&self, line: usize, trip: usize) -> VarId {
        self.offsets[line][trip]
    }

    /// Offset variables, line by line.
    pub fn offsets(&self) -> &[Vec<VarId>] {
        &self.offsets
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeVars> {
        self.edges.get(key)
    }

    /// Edge variables in key order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeVars)> {
        self.edges.iter()
    }

    /// The worst-wait scalar `W`, if the model has one.
    pub fn worst_wait(&self) -> Option<VarId> {
        self.worst_wait
    }

    /// `sum(flow * enabled)` over all edges.
    pub fn weighted_count_expr(&self) -> &LinearExpr {
        &self.weighted_count
    }

    /// Weighted count realized by `solution`, `None` without a solution.
    ///
    /// Fails with [`SolverError::UnknownVariable`] when the solution lacks a
    /// value for one of the indicators.
    pub fn weighted_count(&self, solution: &Solution) -> Result<Option<i64>, SolverError> {
        if !solution.is_solution_found() {
            return Ok(None);
        }
        let mut total = self.weighted_count.constant();
        for &(var, coef) in self.weighted_count.terms() {
            total += coef * solution.require(var)?;
        }
        Ok(Some(total))
    }

    /// Realized departure offsets, line by line, `None` without a solution.
    pub fn offsets_in(&self, solution: &Solution) -> Result<Option<Vec<Vec<i64>>>, SolverError> {
        if !solution.is_solution_found() {
            return Ok(None);
        }
        let offsets = self
            .offsets
            .iter()
            .map(|line| line.iter().map(|&v| solution.require(v)).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(offsets))
    }

    /// Keys of the edges enabled in `solution`.
    pub fn enabled_edges(&self, solution: &Solution) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|(_, vars)| solution.is_true(vars.enabled))
            .map(|(&key, _)| key)
            .collect()
    }
}

/// Writes one stage model into any [`ModelBuilder`].
///
/// Trips and edges are read-only inputs shared by every stage; each call
/// to [`build`](Self::build) creates a fresh, self-contained set of
/// variables and constraints.
///
/// With `S = offset[i,j] - offset[k,l] + slack_offset` and window `w`,
/// every edge gets
///
/// ```text
/// S >= -M * (1 - y)
/// S <= w - 1 + M * (1 - y)
/// ```
///
/// and slack-capturing objectives add `0 <= s <= (w - 1) * y` with
/// `S - M * (1 - y) <= s <= S + M * (1 - y)`.
#[derive(Debug, Clone, Copy)]
pub struct SyncModelBuilder<'a> {
    network: &'a Network,
    trips: &'a TripTable,
    edges: &'a EdgeSet,
    config: &'a SyncConfig,
}

impl<'a> SyncModelBuilder<'a> {
    pub fn new(
        network: &'a Network,
        trips: &'a TripTable,
        edges: &'a EdgeSet,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            network,
            trips,
            edges,
            config,
        }
    }

    /// Builds the stage model for `objective` into `model`.
    pub fn build<B: ModelBuilder + ?Sized>(&self, objective: SyncObjective, model: &mut B) -> SyncVars {
        let capture = objective.captures_slack();
        let big_m = self.network.big_m();

        let offsets: Vec<Vec<VarId>> = self
            .trips
            .iter()
            .fold(vec![Vec::new(); self.trips.line_count()], |mut acc, trip| {
                let name = format!("x{}_{}", trip.line, trip.index);
                acc[trip.line].push(model.int_var(&name, trip.earliest, trip.latest));
                acc
            });

        for rec in self.trips.recurrences() {
            let expr = LinearExpr::var(offsets[rec.line][rec.later]).term(offsets[rec.line][rec.earlier], -1);
            model.add_constraint(expr, Comparator::Eq, rec.headway);
        }

        let mut edges = BTreeMap::new();
        let mut weighted_count = LinearExpr::new();
        for edge in self.edges.iter() {
            let key = edge.key;
            let enabled = model.bool_var(&format!("y{}", key.suffix()));
            let slack = slack_expr(&offsets, edge);

            model.add_constraint(slack.clone().term(enabled, -big_m).plus(big_m), Comparator::Ge, 0);
            model.add_constraint(
                slack.clone().term(enabled, big_m),
                Comparator::Le,
                edge.window - 1 + big_m,
            );

            let slack_var = capture.then(|| {
                let s = model.int_var(&format!("s{}", key.suffix()), 0, edge.max_slack());
                model.add_constraint(
                    LinearExpr::var(s).term(enabled, -edge.max_slack()),
                    Comparator::Le,
                    0,
                );
                let diff = negated(&slack).term(s, 1);
                model.add_constraint(diff.clone().term(enabled, big_m), Comparator::Le, big_m);
                model.add_constraint(diff.term(enabled, -big_m), Comparator::Ge, -big_m);
                s
            });

            if edge.flow != 0 {
                weighted_count.add_term(enabled, edge.flow);
            }
            edges.insert(
                key,
                EdgeVars {
                    enabled,
                    slack: slack_var,
                },
            );
        }

        if self.config.one_connection_per_feeder {
            self.add_one_connection_rows(&edges, model);
        }

        let worst_wait = self.set_objective(objective, &edges, &weighted_count, model);

        debug!(
            ?objective,
            edges = edges.len(),
            capture,
            "stage model built"
        );

        SyncVars {
            offsets,
            edges,
            worst_wait,
            weighted_count,
        }
    }

    /// For every `(i, k, l, m)`, at most one trip `j` of line `i` is
    /// enabled against trip `l` of line `k`.
    fn add_one_connection_rows<B: ModelBuilder + ?Sized>(
        &self,
        edges: &BTreeMap<EdgeKey, EdgeVars>,
        model: &mut B,
    ) {
        let mut groups: BTreeMap<(usize, usize, usize, usize), LinearExpr> = BTreeMap::new();
        for (key, vars) in edges {
            groups
                .entry((key.line, key.other_line, key.other_trip, key.node))
                .or_default()
                .add_term(vars.enabled, 1);
        }
        for expr in groups.into_values().filter(|e| e.terms().len() > 1) {
            model.add_constraint(expr, Comparator::Le, 1);
        }
    }

    fn set_objective<B: ModelBuilder + ?Sized>(
        &self,
        objective: SyncObjective,
        edges: &BTreeMap<EdgeKey, EdgeVars>,
        weighted_count: &LinearExpr,
        model: &mut B,
    ) -> Option<VarId> {
        if let Some(p) = objective.carried_weighted_count() {
            model.add_constraint(weighted_count.clone(), Comparator::Eq, p);
        }

        match objective {
            SyncObjective::Count => {
                let count = edges.values().map(|v| (v.enabled, 1)).collect();
                model.set_objective(count, Sense::Maximize);
                None
            }
            SyncObjective::WeightedCount => {
                model.set_objective(weighted_count.clone(), Sense::Maximize);
                None
            }
            SyncObjective::TotalImbalance { .. } => {
                let imbalance = self
                    .edges
                    .iter()
                    .filter(|e| e.flow != 0)
                    .filter_map(|e| Some((edges.get(&e.key)?.slack?, e.flow)))
                    .collect();
                model.set_objective(imbalance, Sense::Minimize);
                None
            }
            SyncObjective::WorstWait { .. } => {
                let w = model.int_var("w", 0, self.edges.max_slack());
                for s in edges.values().filter_map(|v| v.slack) {
                    model.add_constraint(LinearExpr::var(s).term(w, -1), Comparator::Le, 0);
                }
                model.set_objective(LinearExpr::var(w), Sense::Minimize);
                Some(w)
            }
        }
    }
}

/// `offset[i,j] - offset[k,l] + slack_offset`.
fn slack_expr(offsets: &[Vec<VarId>], edge: &SyncEdge) -> LinearExpr {
    let key = edge.key;
    LinearExpr::var(offsets[key.line][key.trip])
        .term(offsets[key.other_line][key.other_trip], -1)
        .plus(edge.slack_offset)
}

fn negated(expr: &LinearExpr) -> LinearExpr {
    let mut out = LinearExpr::from_constant(-expr.constant());
    for &(v, c) in expr.terms() {
        out.add_term(v, -c);
    }
    out
}
