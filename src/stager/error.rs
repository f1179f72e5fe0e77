use super::types::Stage;
use crate::model::{SolveStatus, SolverError};

/// Failure that stops the lexicographic pipeline.
///
/// Infeasible or unresolved stages are not errors; they are reported
/// through [`PipelineReport::halted`](super::PipelineReport::halted).
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{stage} stage: backend error")]
    Backend {
        stage: Stage,
        #[source]
        source: SolverError,
    },

    #[error("{stage} stage: backend reported {status:?} without an objective value")]
    MissingValue { stage: Stage, status: SolveStatus },

    #[error("{stage} stage: weighted count {found} differs from carried value {expected}")]
    CarriedValueViolated {
        stage: Stage,
        expected: i64,
        found: i64,
    },

    #[error("invalid stager configuration: {0}")]
    Config(String),
}
