//! Stager configuration.

use crate::sync::SyncConfig;
use std::time::Duration;

/// Which secondary refinements of the weighted optimum to run.
///
/// Both refinements start from the same carried value and are
/// independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Secondary {
    /// Minimize the flow-weighted total slack.
    TotalImbalance,
    /// Minimize the largest slack of any enabled transfer.
    WorstWait,
    /// Run both refinements.
    #[default]
    Both,
    /// Stop after the weighted-count stage.
    None,
}

impl Secondary {
    pub fn runs_total_imbalance(self) -> bool {
        matches!(self, Secondary::TotalImbalance | Secondary::Both)
    }

    pub fn runs_worst_wait(self) -> bool {
        matches!(self, Secondary::WorstWait | Secondary::Both)
    }
}

/// Configuration for the lexicographic stager.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_transync::stager::{Secondary, StagerConfig};
///
/// let config = StagerConfig::default()
///     .with_time_budget(Duration::from_secs(5))
///     .with_count_stage(false)
///     .with_secondary(Secondary::WorstWait);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagerConfig {
    /// Wall-clock budget handed to every backend call.
    pub time_budget: Duration,

    /// Run the diagnostic unweighted count stage first.
    pub run_count_stage: bool,

    /// Secondary refinements to run after the weighted count.
    pub secondary: Secondary,

    /// Record realized departure offsets in every stage result.
    pub capture_schedules: bool,

    /// Run the two secondary stages concurrently, each on its own
    /// backend instance. Has no effect without the `parallel` feature.
    pub parallel: bool,

    /// Edge generation options shared by every stage.
    pub sync: SyncConfig,
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(30),
            run_count_stage: true,
            secondary: Secondary::default(),
            capture_schedules: true,
            parallel: false,
            sync: SyncConfig::default(),
        }
    }
}

impl StagerConfig {
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_count_stage(mut self, run: bool) -> Self {
        self.run_count_stage = run;
        self
    }

    pub fn with_secondary(mut self, secondary: Secondary) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn with_capture_schedules(mut self, capture: bool) -> Self {
        self.capture_schedules = capture;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_budget.is_zero() {
            return Err("time_budget must be positive".into());
        }
        Ok(())
    }
}
