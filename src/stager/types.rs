//! Stage results and the pipeline report.

use crate::model::SolveStatus;
use crate::sync::{EdgeKey, SyncObjective};
use std::fmt;
use std::time::Duration;

/// One of the four lexicographic stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// Maximum number of synchronized transfers (diagnostic).
    Count,
    /// Maximum flow-weighted number of synchronized transfers.
    WeightedCount,
    /// Minimum flow-weighted total slack at the weighted optimum.
    TotalImbalance,
    /// Minimum worst slack at the weighted optimum.
    WorstWait,
}

impl Stage {
    /// Stage solving `objective`.
    pub fn of(objective: SyncObjective) -> Self {
        match objective {
            SyncObjective::Count => Stage::Count,
            SyncObjective::WeightedCount => Stage::WeightedCount,
            SyncObjective::TotalImbalance { .. } => Stage::TotalImbalance,
            SyncObjective::WorstWait { .. } => Stage::WorstWait,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Count => "count",
            Stage::WeightedCount => "weighted-count",
            Stage::TotalImbalance => "total-imbalance",
            Stage::WorstWait => "worst-wait",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much a reported value can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Proven optimal by the backend.
    Optimal,
    /// Best value found before the budget ran out. For a maximization
    /// stage it is a lower bound on the optimum.
    BestKnown,
}

impl Provenance {
    /// Provenance of a value reported with `status`, if it carries one.
    pub fn from_status(status: SolveStatus) -> Option<Self> {
        match status {
            SolveStatus::Optimal => Some(Provenance::Optimal),
            SolveStatus::Feasible => Some(Provenance::BestKnown),
            SolveStatus::Infeasible | SolveStatus::Unknown => None,
        }
    }
}

/// Realized departure offsets, line by line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    offsets: Vec<Vec<i64>>,
}

impl Schedule {
    pub fn new(offsets: Vec<Vec<i64>>) -> Self {
        Self { offsets }
    }

    /// Offsets of every trip of line `i`.
    pub fn line(&self, i: usize) -> Option<&[i64]> {
        self.offsets.get(i).map(Vec::as_slice)
    }

    /// Offset of trip `j` of line `i`.
    pub fn offset(&self, line: usize, trip: usize) -> Option<i64> {
        self.offsets.get(line)?.get(trip).copied()
    }

    pub fn lines(&self) -> &[Vec<i64>] {
        &self.offsets
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageResult {
    pub stage: Stage,
    /// Backend status.
    pub status: SolveStatus,
    /// Trust level of `objective_value`; `None` when there is no value.
    pub provenance: Option<Provenance>,
    pub objective_value: Option<i64>,
    /// Flow-weighted count realized by the stage's solution.
    pub weighted_count: Option<i64>,
    /// Edges enabled in the stage's solution.
    pub enabled_edges: Vec<EdgeKey>,
    pub schedule: Option<Schedule>,
    /// Time spent building and solving the stage.
    pub elapsed: Duration,
}

impl StageResult {
    /// Whether the stage produced a value.
    pub fn has_value(&self) -> bool {
        self.objective_value.is_some()
    }
}

/// The weighted-count optimum threaded into the secondary stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarriedValue {
    pub value: i64,
    pub provenance: Provenance,
}

impl CarriedValue {
    /// Whether `value` is a proven optimum rather than a lower bound.
    pub fn is_exact(&self) -> bool {
        self.provenance == Provenance::Optimal
    }
}

/// Stage that stopped the pipeline, with the status it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Halt {
    pub stage: Stage,
    pub status: SolveStatus,
}

/// Results of a full lexicographic run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineReport {
    /// Results in execution order.
    pub results: Vec<StageResult>,
    /// Weighted-count value carried into the secondary stages.
    pub carried: Option<CarriedValue>,
    /// Set when the weighted-count stage produced no value.
    pub halted: Option<Halt>,
}

impl PipelineReport {
    /// Result of `stage`, if it ran.
    pub fn result(&self, stage: Stage) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    /// Objective value of `stage`, if it ran and produced one.
    pub fn value(&self, stage: Stage) -> Option<i64> {
        self.result(stage)?.objective_value
    }

    /// Whether every stage that ran was proven optimal.
    pub fn all_optimal(&self) -> bool {
        self.halted.is_none()
            && self
                .results
                .iter()
                .all(|r| r.provenance == Some(Provenance::Optimal))
    }
}
