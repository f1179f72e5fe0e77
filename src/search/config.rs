//! Search configuration.

/// Configuration for the bundled depth-first branch & bound.
///
/// The wall-clock budget is not part of the configuration; it is passed
/// to every [`solve`](crate::model::SolverBackend::solve) call.
///
/// # Examples
///
/// ```
/// use u_transync::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_node_limit(50_000)
///     .with_split_threshold(8);
/// assert_eq!(config.node_limit, Some(50_000));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of search nodes. `None` = unlimited.
    ///
    /// Hitting the limit ends the search early, like an exhausted time
    /// budget: the incumbent is reported as feasible, not optimal.
    pub node_limit: Option<u64>,

    /// Stop at the first feasible solution.
    pub stop_after_first: bool,

    /// Domains larger than this are bisected instead of enumerated
    /// value by value.
    pub split_threshold: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            node_limit: None,
            stop_after_first: false,
            split_threshold: 16,
        }
    }
}

impl SearchConfig {
    /// Sets the node limit.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Stops at the first feasible solution.
    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Sets the bisection threshold.
    pub fn with_split_threshold(mut self, threshold: i64) -> Self {
        self.split_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.split_threshold < 2 {
            return Err(format!(
                "split_threshold must be at least 2, got {}",
                self.split_threshold
            ));
        }
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive".into());
        }
        Ok(())
    }
}
