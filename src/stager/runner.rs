//! Lexicographic stage driver.

use super::config::StagerConfig;
use super::error::StageError;
use super::types::{CarriedValue, Halt, PipelineReport, Provenance, Schedule, Stage, StageResult};
use crate::model::{SolverBackend, SolverError};
use crate::network::Network;
use crate::sync::{EdgeSet, SyncModelBuilder, SyncObjective};
use crate::trips::TripTable;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the four lexicographic stages against fresh backend instances.
///
/// Trips and edges are computed once; every stage writes its own model
/// into a new backend obtained from the caller's factory. The only value
/// threaded between stages is the weighted-count optimum, re-imposed as
/// an equality in the secondary stages.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_transync::network::{Network, NetworkData};
/// use u_transync::search::DfsSolver;
/// use u_transync::stager::{LexStager, Stage, StagerConfig};
///
/// let data = NetworkData::new(vec![10, 10], 20)
///     .with_travel_times(vec![vec![Some(5)], vec![Some(3)]])
///     .with_transfer_times(vec![1])
///     .with_flow(1, 0, 0, 12);
/// let network = Network::new(data).unwrap();
///
/// let config = StagerConfig::default().with_time_budget(Duration::from_secs(10));
/// let report = LexStager::new(&network, config).run(DfsSolver::new).unwrap();
///
/// assert_eq!(report.value(Stage::WeightedCount), Some(24));
/// assert!(report.carried.unwrap().is_exact());
/// ```
#[derive(Debug, Clone)]
pub struct LexStager<'a> {
    network: &'a Network,
    config: StagerConfig,
    trips: TripTable,
    edges: EdgeSet,
}

impl<'a> LexStager<'a> {
    /// Generates trips and edges for `network`.
    pub fn new(network: &'a Network, config: StagerConfig) -> Self {
        let trips = TripTable::new(network);
        let edges = EdgeSet::build(network, &trips, &config.sync);
        Self::with_edges(network, config, edges)
    }

    /// Uses a precomputed (possibly restricted) edge set.
    pub fn with_edges(network: &'a Network, config: StagerConfig, edges: EdgeSet) -> Self {
        Self {
            network,
            trips: TripTable::new(network),
            config,
            edges,
        }
    }

    pub fn config(&self) -> &StagerConfig {
        &self.config
    }

    pub fn trips(&self) -> &TripTable {
        &self.trips
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    /// Builds the model for `objective` into `backend` and solves it.
    ///
    /// Backend failures are returned as errors. Infeasible or unresolved
    /// models produce a result without a value.
    pub fn run_stage<B: SolverBackend>(
        &self,
        objective: SyncObjective,
        mut backend: B,
    ) -> Result<StageResult, StageError> {
        let stage = Stage::of(objective);
        let start = Instant::now();

        let vars = SyncModelBuilder::new(self.network, &self.trips, &self.edges, &self.config.sync)
            .build(objective, &mut backend);
        info!(%stage, backend = backend.name(), edges = self.edges.len(), "stage started");

        let solution = backend
            .solve(self.config.time_budget)
            .map_err(|source| StageError::Backend { stage, source })?;
        let status = solution.status;

        let mut result = StageResult {
            stage,
            status,
            provenance: Provenance::from_status(status),
            objective_value: None,
            weighted_count: None,
            enabled_edges: Vec::new(),
            schedule: None,
            elapsed: Default::default(),
        };

        if status.has_solution() {
            let value = solution
                .objective_value
                .ok_or(StageError::MissingValue { stage, status })?;
            let backend_error = |source: SolverError| StageError::Backend { stage, source };
            let weighted = vars.weighted_count(&solution).map_err(backend_error)?;
            if let (Some(expected), Some(found)) = (objective.carried_weighted_count(), weighted) {
                if expected != found {
                    return Err(StageError::CarriedValueViolated {
                        stage,
                        expected,
                        found,
                    });
                }
            }

            result.objective_value = Some(value);
            result.weighted_count = weighted;
            result.enabled_edges = vars.enabled_edges(&solution);
            if self.config.capture_schedules {
                result.schedule = vars
                    .offsets_in(&solution)
                    .map_err(backend_error)?
                    .map(Schedule::new);
            }
        }
        result.elapsed = start.elapsed();

        match result.provenance {
            Some(provenance) => info!(
                %stage,
                value = result.objective_value,
                ?provenance,
                enabled = result.enabled_edges.len(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "stage finished"
            ),
            None => warn!(
                %stage,
                ?status,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "stage finished without a value"
            ),
        }
        Ok(result)
    }

    /// Runs the configured stages in order.
    ///
    /// A weighted-count stage without a value halts the pipeline: there
    /// is nothing to carry into the secondary stages. The diagnostic count
    /// stage and the secondary stages never halt it.
    pub fn run<B, F>(&self, factory: F) -> Result<PipelineReport, StageError>
    where
        B: SolverBackend,
        F: Fn() -> B + Sync,
    {
        self.config.validate().map_err(StageError::Config)?;
        let mut report = PipelineReport::default();

        if self.config.run_count_stage {
            report
                .results
                .push(self.run_stage(SyncObjective::Count, factory())?);
        }

        let weighted = self.run_stage(SyncObjective::WeightedCount, factory())?;
        let status = weighted.status;
        let carried = weighted
            .objective_value
            .zip(weighted.provenance)
            .map(|(value, provenance)| CarriedValue { value, provenance });
        report.results.push(weighted);

        let Some(carried) = carried else {
            warn!(?status, "weighted-count stage produced no value, secondary stages skipped");
            report.halted = Some(Halt {
                stage: Stage::WeightedCount,
                status,
            });
            return Ok(report);
        };
        if !carried.is_exact() {
            warn!(
                value = carried.value,
                "carried weighted count is best-known only and bounds the optimum from below"
            );
        }
        report.carried = Some(carried);

        let p = carried.value;
        let secondary = self.config.secondary;
        let factory = &factory;
        let imbalance = move || {
            secondary
                .runs_total_imbalance()
                .then(|| self.run_stage(SyncObjective::TotalImbalance { weighted_count: p }, factory()))
                .transpose()
        };
        let worst = move || {
            secondary
                .runs_worst_wait()
                .then(|| self.run_stage(SyncObjective::WorstWait { weighted_count: p }, factory()))
                .transpose()
        };

        let (imbalance, worst) = self.join(imbalance, worst);
        report.results.extend(imbalance?);
        report.results.extend(worst?);
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn join<RA, RB>(
        &self,
        a: impl FnOnce() -> RA + Send,
        b: impl FnOnce() -> RB + Send,
    ) -> (RA, RB)
    where
        RA: Send,
        RB: Send,
    {
        if self.config.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn join<RA, RB>(&self, a: impl FnOnce() -> RA, b: impl FnOnce() -> RB) -> (RA, RB) {
        (a(), b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::{
        Comparator, LinearExpr, LinearModel, ModelBuilder, Sense, SolveStatus, Solution,
        SolverError, VarId,
    };
    use crate::network::NetworkData;
    use crate::search::{DfsSolver, SearchConfig};
    use crate::stager::Secondary;
    use crate::sync::SyncConfig;
    use std::time::Duration;

    fn config() -> StagerConfig {
        StagerConfig::default().with_time_budget(Duration::from_secs(600))
    }

    /// Stage optima found by enumerating every first-trip offset.
    #[derive(Debug, PartialEq, Eq)]
    struct Oracle {
        count: i64,
        weighted: i64,
        imbalance: i64,
        worst: i64,
    }

    fn oracle(network: &Network, edges: &EdgeSet) -> Oracle {
        let trips = TripTable::new(network);
        let mut firsts = vec![Vec::new()];
        for i in 0..network.line_count() {
            let h = network.line(i).headway();
            let n = trips.line(i).len() as i64;
            let last = h.min(network.horizon() - (n - 1) * h);
            firsts = firsts
                .into_iter()
                .flat_map(|f: Vec<i64>| {
                    (0..=last).map(move |x| {
                        let mut g = f.clone();
                        g.push(x);
                        g
                    })
                })
                .collect();
        }

        let evaluated: Vec<(i64, i64, i64, i64)> = firsts
            .iter()
            .map(|first| {
                let offset = |i: usize, j: usize| first[i] + j as i64 * network.line(i).headway();
                let (mut count, mut weighted, mut imbalance, mut worst) = (0, 0, 0, 0);
                for e in edges.iter() {
                    let k = e.key;
                    let s = e.slack(offset(k.line, k.trip), offset(k.other_line, k.other_trip));
                    if !e.in_window(s) {
                        continue;
                    }
                    count += 1;
                    if e.flow > 0 {
                        weighted += e.flow;
                        imbalance += e.flow * s;
                        worst = worst.max(s);
                    }
                }
                (count, weighted, imbalance, worst)
            })
            .collect();

        let count = evaluated.iter().map(|e| e.0).max().unwrap();
        let weighted = evaluated.iter().map(|e| e.1).max().unwrap();
        let at_optimum: Vec<_> = evaluated.iter().filter(|e| e.1 == weighted).collect();
        Oracle {
            count,
            weighted,
            imbalance: at_optimum.iter().map(|e| e.2).min().unwrap(),
            worst: at_optimum.iter().map(|e| e.3).min().unwrap(),
        }
    }

    fn assert_headways(network: &Network, result: &StageResult) {
        let schedule = result.schedule.as_ref().unwrap();
        for (i, offsets) in schedule.lines().iter().enumerate() {
            for pair in offsets.windows(2) {
                assert_eq!(pair[1] - pair[0], network.line(i).headway(), "line {i}");
            }
        }
    }

    #[test]
    fn test_small_network_matches_enumeration() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config());
        assert_eq!(stager.trips().counts(), vec![3, 3, 3, 2]);

        let report = stager.run(DfsSolver::new).unwrap();
        let expected = oracle(&network, stager.edges());

        assert!(report.halted.is_none());
        assert!(report.all_optimal());
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.value(Stage::Count), Some(expected.count));
        assert_eq!(report.value(Stage::WeightedCount), Some(expected.weighted));
        assert_eq!(report.value(Stage::TotalImbalance), Some(expected.imbalance));
        assert_eq!(report.value(Stage::WorstWait), Some(expected.worst));

        let count = report.value(Stage::Count).unwrap();
        assert!(count >= 0);
        assert!(count as usize <= stager.edges().stats().cross_line());

        let carried = report.carried.unwrap();
        assert_eq!(carried.value, expected.weighted);
        assert!(carried.is_exact());
        for stage in [Stage::TotalImbalance, Stage::WorstWait] {
            assert_eq!(report.result(stage).unwrap().weighted_count, Some(carried.value));
        }
        for result in &report.results {
            assert_headways(&network, result);
            assert!(result.enabled_edges.iter().all(|k| k.line != k.other_line));
        }
    }

    #[test]
    fn test_no_shared_nodes_is_trivially_optimal() {
        let network = fixtures::disjoint_network();
        let report = LexStager::new(&network, config()).run(DfsSolver::new).unwrap();

        assert!(report.all_optimal());
        for stage in [Stage::Count, Stage::WeightedCount, Stage::TotalImbalance, Stage::WorstWait] {
            let result = report.result(stage).unwrap();
            assert_eq!(result.status, SolveStatus::Optimal);
            assert_eq!(result.objective_value, Some(0));
            assert!(result.enabled_edges.is_empty());
        }
    }

    const ALL_STAGES: [Stage; 4] = [
        Stage::Count,
        Stage::WeightedCount,
        Stage::TotalImbalance,
        Stage::WorstWait,
    ];

    fn stage_values(report: &PipelineReport) -> Vec<(Stage, Option<i64>)> {
        ALL_STAGES.iter().map(|&s| (s, report.value(s))).collect()
    }

    #[test]
    fn test_pruning_keeps_every_optimum() {
        let network = fixtures::small_network();
        let pruned_stager = LexStager::new(&network, config());
        let full_stager = LexStager::new(
            &network,
            config().with_sync(SyncConfig::default().with_prune_disjoint_windows(false)),
        );
        assert!(full_stager.edges().len() > pruned_stager.edges().len());

        let pruned = pruned_stager.run(DfsSolver::new).unwrap();
        let full = full_stager.run(DfsSolver::new).unwrap();

        assert!(pruned.all_optimal());
        assert!(full.all_optimal());
        assert_eq!(pruned.results.len(), 4);
        assert_eq!(stage_values(&pruned), stage_values(&full));
        assert_eq!(
            stage_values(&pruned),
            vec![
                (Stage::Count, Some(21)),
                (Stage::WeightedCount, Some(285)),
                (Stage::TotalImbalance, Some(450)),
                (Stage::WorstWait, Some(10)),
            ]
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_secondary_stages_match_serial() {
        let network = fixtures::small_network();
        let serial = LexStager::new(&network, config().with_parallel(false))
            .run(DfsSolver::new)
            .unwrap();
        let parallel = LexStager::new(&network, config().with_parallel(true))
            .run(DfsSolver::new)
            .unwrap();

        assert!(parallel.all_optimal());
        assert_eq!(parallel.carried, serial.carried);
        let stages = |r: &PipelineReport| r.results.iter().map(|x| x.stage).collect::<Vec<_>>();
        assert_eq!(stages(&parallel), ALL_STAGES.to_vec());
        assert_eq!(stage_values(&parallel), stage_values(&serial));
        for stage in [Stage::TotalImbalance, Stage::WorstWait] {
            let result = parallel.result(stage).unwrap();
            assert_eq!(result.weighted_count, Some(285));
            assert_headways(&network, result);
        }
    }

    #[test]
    fn test_weighted_stage_is_idempotent() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config());
        let first = stager.run_stage(SyncObjective::WeightedCount, DfsSolver::new()).unwrap();
        let second = stager.run_stage(SyncObjective::WeightedCount, DfsSolver::new()).unwrap();

        assert_eq!(first.provenance, Some(Provenance::Optimal));
        assert_eq!(first.objective_value, second.objective_value);
    }

    #[test]
    fn test_restricting_edges_never_improves() {
        let network = fixtures::small_network();
        let trips = TripTable::new(&network);
        let edges = EdgeSet::build(&network, &trips, &SyncConfig::default());
        let mut restricted = edges.clone();
        restricted.retain(|e| e.key.node != 0);

        let full = LexStager::with_edges(&network, config(), edges)
            .run_stage(SyncObjective::WeightedCount, DfsSolver::new())
            .unwrap();
        let sub = LexStager::with_edges(&network, config(), restricted)
            .run_stage(SyncObjective::WeightedCount, DfsSolver::new())
            .unwrap();

        assert!(full.objective_value.unwrap() >= sub.objective_value.unwrap());
    }

    #[test]
    fn test_one_connection_per_feeder_bounds_the_count() {
        let network = fixtures::small_network();
        let plain = LexStager::new(&network, config());
        let limited = LexStager::new(
            &network,
            config().with_sync(SyncConfig::default().with_one_connection_per_feeder(true)),
        );

        let a = plain.run_stage(SyncObjective::Count, DfsSolver::new()).unwrap();
        let b = limited.run_stage(SyncObjective::Count, DfsSolver::new()).unwrap();
        assert_eq!(b.status, SolveStatus::Optimal);
        assert!(b.objective_value.unwrap() <= a.objective_value.unwrap());
    }

    #[test]
    fn test_first_solution_is_best_known() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config().with_count_stage(false));
        let report = stager
            .run(|| DfsSolver::with_config(SearchConfig::default().with_stop_after_first(true)))
            .unwrap();

        let carried = report.carried.unwrap();
        assert_eq!(carried.provenance, Provenance::BestKnown);
        assert!(!carried.is_exact());
        assert!(!report.all_optimal());
        for stage in [Stage::TotalImbalance, Stage::WorstWait] {
            let result = report.result(stage).unwrap();
            assert!(result.has_value());
            assert_eq!(result.weighted_count, Some(carried.value));
        }
    }

    #[test]
    fn test_secondary_selection() {
        let network = fixtures::disjoint_network();
        let report = LexStager::new(
            &network,
            config().with_count_stage(false).with_secondary(Secondary::WorstWait),
        )
        .run(DfsSolver::new)
        .unwrap();

        let stages: Vec<Stage> = report.results.iter().map(|r| r.stage).collect();
        assert_eq!(stages, vec![Stage::WeightedCount, Stage::WorstWait]);
    }

    #[test]
    fn test_schedules_can_be_skipped() {
        let network = fixtures::disjoint_network();
        let report = LexStager::new(&network, config().with_capture_schedules(false))
            .run(DfsSolver::new)
            .unwrap();
        assert!(report.results.iter().all(|r| r.schedule.is_none()));
    }

    #[test]
    fn test_invalid_config() {
        let network = fixtures::disjoint_network();
        let stager = LexStager::new(&network, config().with_time_budget(Duration::ZERO));
        let err = stager.run(DfsSolver::new).unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    /// Records the model and answers every solve with a canned outcome.
    struct ScriptedBackend {
        model: LinearModel,
        outcome: fn(&LinearModel) -> Result<Solution, SolverError>,
    }

    impl ScriptedBackend {
        fn new(outcome: fn(&LinearModel) -> Result<Solution, SolverError>) -> Self {
            Self {
                model: LinearModel::new("scripted"),
                outcome,
            }
        }
    }

    impl ModelBuilder for ScriptedBackend {
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

    impl SolverBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn solve(&mut self, _time_budget: Duration) -> Result<Solution, SolverError> {
            (self.outcome)(&self.model)
        }
    }

    #[test]
    fn test_backend_failure_is_an_error() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config());
        let err = stager
            .run(|| {
                ScriptedBackend::new(|_| {
                    Err(SolverError::Backend {
                        backend: "scripted".into(),
                        message: "connection reset".into(),
                    })
                })
            })
            .unwrap_err();

        assert!(matches!(
            err,
            StageError::Backend {
                stage: Stage::Count,
                ..
            }
        ));
    }

    #[test]
    fn test_infeasible_weighted_stage_halts() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config().with_count_stage(false));
        let report = stager
            .run(|| ScriptedBackend::new(|_| Ok(Solution::empty(SolveStatus::Infeasible))))
            .unwrap();

        assert_eq!(
            report.halted,
            Some(Halt {
                stage: Stage::WeightedCount,
                status: SolveStatus::Infeasible,
            })
        );
        assert!(report.carried.is_none());
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].has_value());
    }

    #[test]
    fn test_missing_objective_value_is_an_error() {
        let network = fixtures::disjoint_network();
        let stager = LexStager::new(&network, config());
        let err = stager
            .run_stage(
                SyncObjective::WeightedCount,
                ScriptedBackend::new(|m| {
                    Ok(Solution::new(
                        SolveStatus::Optimal,
                        None,
                        vec![0; m.var_count()],
                        Duration::ZERO,
                    ))
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StageError::MissingValue { .. }));
    }

    #[test]
    fn test_truncated_solution_is_a_backend_error() {
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config());
        let err = stager
            .run_stage(
                SyncObjective::WeightedCount,
                ScriptedBackend::new(|_| {
                    Ok(Solution::new(SolveStatus::Optimal, Some(0), Vec::new(), Duration::ZERO))
                }),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::Backend {
                stage: Stage::WeightedCount,
                source: SolverError::UnknownVariable(_),
            }
        ));
    }

    #[test]
    fn test_carried_value_is_checked() {
        // a backend ignoring the equality row: all-lower-bound assignment
        let network = fixtures::small_network();
        let stager = LexStager::new(&network, config());
        let err = stager
            .run_stage(
                SyncObjective::TotalImbalance { weighted_count: 30 },
                ScriptedBackend::new(|m| {
                    let values = m.vars().iter().map(|v| v.lb).collect();
                    Ok(Solution::new(SolveStatus::Feasible, Some(0), values, Duration::ZERO))
                }),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::CarriedValueViolated {
                expected: 30,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_large_network_builds_stage_models() {
        let network = Network::new(fixtures::large_network_data()).unwrap();
        let stager = LexStager::new(&network, config());
        let mut model = LinearModel::new("large");
        let vars = SyncModelBuilder::new(&network, stager.trips(), stager.edges(), &stager.config().sync)
            .build(SyncObjective::WorstWait { weighted_count: 0 }, &mut model);

        assert!(model.validate().is_ok());
        assert_eq!(model.bool_count(), stager.edges().len());
        assert_eq!(vars.offsets().len(), 11);
        assert!(model.to_lp_string().contains("Binaries"));
    }

    #[test]
    fn test_unreachable_carried_value_is_infeasible() {
        // no edges: the carried equality reads 0 = 5
        let network = fixtures::disjoint_network();
        let stager = LexStager::new(&network, config());
        let objective = SyncObjective::TotalImbalance { weighted_count: 5 };

        let mut model = LinearModel::new("unreachable");
        SyncModelBuilder::new(&network, stager.trips(), stager.edges(), &stager.config().sync)
            .build(objective, &mut model);
        assert!(model.to_lp_string().contains("+ 1 const_zero = 5\n"));

        let result = stager.run_stage(objective, DfsSolver::new()).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(!result.has_value());
    }

    #[test]
    fn test_unserved_flows_do_not_count() {
        // flow recorded at a node line 1 never reaches
        let data = NetworkData::new(vec![10, 10], 20)
            .with_travel_times(vec![vec![Some(5), Some(2)], vec![Some(3), None]])
            .with_transfer_times(vec![0, 0])
            .with_flow(1, 0, 1, 100);
        let network = Network::new(data).unwrap();
        let report = LexStager::new(&network, config()).run(DfsSolver::new).unwrap();
        assert_eq!(report.value(Stage::WeightedCount), Some(0));
    }
}
