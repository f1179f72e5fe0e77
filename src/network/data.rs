//! Raw network input record.

/// One directional passenger-flow estimate.
///
/// `volume` passengers alight line `from` and board line `to` at `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowEntry {
    /// Line passengers alight from.
    pub from: usize,
    /// Line passengers board.
    pub to: usize,
    /// Transfer node.
    pub node: usize,
    /// Passenger volume (non-negative).
    pub volume: i64,
}

/// Unvalidated network input, as handed over by a loader.
///
/// Times are whole minutes. `travel_times[line][node]` is `None` when the
/// line does not serve the node. Convert into a [`Network`](super::Network)
/// with [`Network::new`](super::Network::new) to validate it.
///
/// # Examples
///
/// ```
/// use u_transync::network::{Network, NetworkData};
///
/// let data = NetworkData::new(vec![10, 20], 30)
///     .with_travel_times(vec![vec![Some(5)], vec![Some(8)]])
///     .with_transfer_times(vec![1])
///     .with_flow(1, 0, 0, 40);
/// let network = Network::new(data).unwrap();
/// assert_eq!(network.flow(1, 0, 0), 40);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkData {
    /// Headway of each line.
    pub headways: Vec<i64>,
    /// Travel time from each line's origin to each transfer node.
    pub travel_times: Vec<Vec<Option<i64>>>,
    /// Transfer (walk/dwell) time at each node.
    pub transfer_times: Vec<i64>,
    /// Operating horizon.
    pub horizon: i64,
    /// Big-M magnitude for indicator linearizations. `None` picks the
    /// smallest safe value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub big_m: Option<i64>,
    /// Passenger-flow estimates. Pairs not listed carry zero flow.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flows: Vec<FlowEntry>,
}

impl NetworkData {
    /// Creates an input record with the given headways and horizon.
    pub fn new(headways: Vec<i64>, horizon: i64) -> Self {
        Self {
            headways,
            horizon,
            ..Self::default()
        }
    }

    /// Builds input from a dense travel-time matrix where unserved
    /// line/node pairs are marked with `sentinel`.
    ///
    /// ```
    /// use u_transync::network::NetworkData;
    ///
    /// let data = NetworkData::from_sentinel_matrix(
    ///     vec![10, 10],
    ///     &[vec![5, 10_000], vec![7, 3]],
    ///     10_000,
    ///     vec![0, 2],
    ///     30,
    /// );
    /// assert_eq!(data.travel_times[0], vec![Some(5), None]);
    /// ```
    pub fn from_sentinel_matrix(
        headways: Vec<i64>,
        travel_times: &[Vec<i64>],
        sentinel: i64,
        transfer_times: Vec<i64>,
        horizon: i64,
    ) -> Self {
        let travel_times = travel_times
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&t| if t == sentinel { None } else { Some(t) })
                    .collect()
            })
            .collect();
        Self {
            headways,
            travel_times,
            transfer_times,
            horizon,
            big_m: None,
            flows: Vec::new(),
        }
    }

    pub fn with_travel_times(mut self, travel_times: Vec<Vec<Option<i64>>>) -> Self {
        self.travel_times = travel_times;
        self
    }

    pub fn with_transfer_times(mut self, transfer_times: Vec<i64>) -> Self {
        self.transfer_times = transfer_times;
        self
    }

    /// Sets an explicit big-M magnitude.
    pub fn with_big_m(mut self, big_m: i64) -> Self {
        self.big_m = Some(big_m);
        self
    }

    /// Adds a flow of `volume` passengers alighting `from` and boarding `to` at `node`.
    pub fn with_flow(mut self, from: usize, to: usize, node: usize, volume: i64) -> Self {
        self.flows.push(FlowEntry {
            from,
            to,
            node,
            volume,
        });
        self
    }

    /// Number of transfer nodes described by this input.
    pub fn node_count(&self) -> usize {
        self.transfer_times.len()
    }
}
