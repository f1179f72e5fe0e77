//! Edge-builder configuration.

/// Options controlling which synchronization edges are generated and
/// which optional constraint families are emitted.
///
/// # Examples
///
/// ```
/// use u_transync::sync::SyncConfig;
///
/// let config = SyncConfig::default()
///     .with_prune_disjoint_windows(false)
///     .with_one_connection_per_feeder(true);
/// assert!(!config.prune_disjoint_windows);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncConfig {
    /// Omit edges whose slack range, given the two trips' departure
    /// domains, cannot meet the timing window.
    ///
    /// Such edges could only ever take indicator 0, so omitting them
    /// shrinks the model without changing any optimum.
    pub prune_disjoint_windows: bool,

    /// For each trip `(k, l)` and node `m`, allow at most one trip of a
    /// given line `i` to synchronize with it.
    pub one_connection_per_feeder: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prune_disjoint_windows: true,
            one_connection_per_feeder: false,
        }
    }
}

impl SyncConfig {
    /// Enables or disables window pre-pruning.
    pub fn with_prune_disjoint_windows(mut self, prune: bool) -> Self {
        self.prune_disjoint_windows = prune;
        self
    }

    /// Enables or disables the one-connection-per-feeder family.
    pub fn with_one_connection_per_feeder(mut self, enabled: bool) -> Self {
        self.one_connection_per_feeder = enabled;
        self
    }
}
