//! Validated, immutable network model.

use super::data::NetworkData;
use super::error::NetworkError;
use std::collections::BTreeMap;

/// Largest horizon, headway, travel time, transfer time or (summed) flow
/// volume accepted by [`Network::new`].
///
/// Keeps the derived big-M, slack offsets and row bounds inside `i64`.
pub const MAX_MAGNITUDE: i64 = 1 << 40;

/// Largest explicit big-M accepted by [`Network::new`].
pub const MAX_BIG_M: i64 = 1 << 50;

/// A transit line with a fixed headway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    headway: i64,
    travel_times: Vec<Option<i64>>,
}

impl Line {
    /// Time between successive departures.
    pub fn headway(&self) -> i64 {
        self.headway
    }

    /// Travel time from the origin to `node`, or `None` if the line does
    /// not serve it.
    pub fn travel_time(&self, node: usize) -> Option<i64> {
        self.travel_times.get(node).copied().flatten()
    }

    /// Whether the line stops at `node`.
    pub fn serves(&self, node: usize) -> bool {
        self.travel_time(node).is_some()
    }
}

/// A node where passengers may switch lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferNode {
    transfer_time: i64,
}

impl TransferNode {
    /// Walk/dwell time charged when switching lines here.
    pub fn transfer_time(&self) -> i64 {
        self.transfer_time
    }
}

/// Static description of the lines, transfer nodes and flows.
///
/// Built once from [`NetworkData`] and never mutated. Every table is
/// structurally consistent: one travel-time row per line, one column per
/// node, flows only between existing lines and nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    lines: Vec<Line>,
    nodes: Vec<TransferNode>,
    flows: BTreeMap<(usize, usize, usize), i64>,
    horizon: i64,
    big_m: i64,
}

impl Network {
    /// Validates `data` and builds the network.
    pub fn new(data: NetworkData) -> Result<Self, NetworkError> {
        let NetworkData {
            headways,
            travel_times,
            transfer_times,
            horizon,
            big_m,
            flows: flow_entries,
        } = data;

        if horizon < 0 {
            return Err(NetworkError::NegativeHorizon(horizon));
        }
        bounded("horizon", horizon, MAX_MAGNITUDE)?;
        if travel_times.len() != headways.len() {
            return Err(NetworkError::TravelTimeRows {
                expected: headways.len(),
                found: travel_times.len(),
            });
        }

        let node_count = transfer_times.len();
        let mut lines = Vec::with_capacity(headways.len());
        for (line, (&headway, row)) in headways.iter().zip(travel_times).enumerate() {
            if headway <= 0 {
                return Err(NetworkError::NonPositiveHeadway { line, headway });
            }
            bounded("headway", headway, MAX_MAGNITUDE)?;
            if row.len() != node_count {
                return Err(NetworkError::RaggedTravelTimes {
                    line,
                    expected: node_count,
                    found: row.len(),
                });
            }
            if let Some((node, value)) = row
                .iter()
                .enumerate()
                .find_map(|(node, t)| t.filter(|&v| v < 0).map(|v| (node, v)))
            {
                return Err(NetworkError::NegativeTravelTime { line, node, value });
            }
            for &value in row.iter().flatten() {
                bounded("travel time", value, MAX_MAGNITUDE)?;
            }
            lines.push(Line {
                headway,
                travel_times: row,
            });
        }

        let mut nodes = Vec::with_capacity(node_count);
        for (node, &value) in transfer_times.iter().enumerate() {
            if value < 0 {
                return Err(NetworkError::NegativeTransferTime { node, value });
            }
            bounded("transfer time", value, MAX_MAGNITUDE)?;
            nodes.push(TransferNode {
                transfer_time: value,
            });
        }

        let mut flows = BTreeMap::new();
        for entry in flow_entries {
            if entry.from >= lines.len() || entry.to >= lines.len() || entry.node >= node_count {
                return Err(NetworkError::FlowIndexOutOfRange {
                    from: entry.from,
                    to: entry.to,
                    node: entry.node,
                });
            }
            if entry.volume < 0 {
                return Err(NetworkError::NegativeFlow {
                    from: entry.from,
                    to: entry.to,
                    node: entry.node,
                    volume: entry.volume,
                });
            }
            let volume = bounded("flow", entry.volume, MAX_MAGNITUDE)?;
            let total = flows.entry((entry.from, entry.to, entry.node)).or_insert(0);
            *total = bounded("flow", *total + volume, MAX_MAGNITUDE)?;
        }

        let required = required_big_m(&lines, &nodes, horizon);
        let big_m = match big_m {
            Some(m) if m > MAX_BIG_M => return Err(too_large("big-M", m, MAX_BIG_M)),
            Some(m) if m < required => {
                return Err(NetworkError::BigMTooSmall {
                    big_m: m,
                    required,
                })
            }
            Some(m) => m,
            None => required,
        };

        Ok(Self {
            lines,
            nodes,
            flows,
            horizon,
            big_m,
        })
    }

    /// All lines, indexed by line id.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn line(&self, i: usize) -> &Line {
        &self.lines[i]
    }

    /// All transfer nodes, indexed by node id.
    pub fn nodes(&self) -> &[TransferNode] {
        &self.nodes
    }

    /// Node `m`.
    ///
    /// # Panics
    ///
    /// Panics if `m` is out of range.
    pub fn node(&self, m: usize) -> &TransferNode {
        &self.nodes[m]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Operating horizon.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Big-M magnitude used by every indicator linearization.
    pub fn big_m(&self) -> i64 {
        self.big_m
    }

    /// Passengers alighting line `from` and boarding line `to` at `node`.
    pub fn flow(&self, from: usize, to: usize, node: usize) -> i64 {
        self.flows.get(&(from, to, node)).copied().unwrap_or(0)
    }

    /// Whether lines `i` and `k` both serve `node`.
    pub fn shares_node(&self, i: usize, k: usize, node: usize) -> bool {
        self.lines[i].serves(node) && self.lines[k].serves(node)
    }
}

impl TryFrom<NetworkData> for Network {
    type Error = NetworkError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        Network::new(data)
    }
}

fn bounded(what: &'static str, value: i64, limit: i64) -> Result<i64, NetworkError> {
    if value > limit {
        return Err(too_large(what, value, limit));
    }
    Ok(value)
}

fn too_large(what: &'static str, value: i64, limit: i64) -> NetworkError {
    NetworkError::ValueTooLarge { what, value, limit }
}

/// Smallest big-M that relaxes every timing and slack-capture constraint.
///
/// Departure offsets lie in `[0, H]`, so `|slack| <= H + maxTravel + maxTransfer`
/// and the captured slack never exceeds the widest window. Every input is
/// at most [`MAX_MAGNITUDE`], so the sum stays far below `i64::MAX`.
fn required_big_m(lines: &[Line], nodes: &[TransferNode], horizon: i64) -> i64 {
    let max_travel = lines
        .iter()
        .flat_map(|l| l.travel_times.iter().flatten())
        .copied()
        .max()
        .unwrap_or(0);
    let max_headway = lines.iter().map(|l| l.headway).max().unwrap_or(0);
    let max_transfer = nodes.iter().map(|n| n.transfer_time).max().unwrap_or(0);
    horizon + max_travel + max_transfer + max_travel.max(max_headway) + 1
}
