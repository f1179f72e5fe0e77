//! Candidate synchronization edges.

use super::config::SyncConfig;
use crate::network::Network;
use crate::trips::{TripDomain, TripTable};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Key of a synchronization edge `(i, j, k, l, m)`.
///
/// Relates trip `j` of line `i` and trip `l` of line `k` at node `m`.
/// The edge's slack is
/// `offset[i,j] + travel(i,m) - offset[k,l] - travel(k,m) - transfer(m)`:
/// how long after the `(k, l)` arrival plus the transfer time the
/// `(i, j)` trip reaches the node. It is weighted by `flow(k, i, m)`,
/// the passengers alighting line `k` and boarding line `i` there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    /// Line `i`.
    pub line: usize,
    /// Trip `j` of line `i`.
    pub trip: usize,
    /// Line `k`.
    pub other_line: usize,
    /// Trip `l` of line `k`.
    pub other_trip: usize,
    /// Node `m`.
    pub node: usize,
}

impl EdgeKey {
    pub fn new(line: usize, trip: usize, other_line: usize, other_trip: usize, node: usize) -> Self {
        Self {
            line,
            trip,
            other_line,
            other_trip,
            node,
        }
    }

    /// Variable-name suffix `i_j_k_l_m`.
    pub fn suffix(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.line, self.trip, self.other_line, self.other_trip, self.node
        )
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})~({},{})@{}",
            self.line, self.trip, self.other_line, self.other_trip, self.node
        )
    }
}

/// A cross-line edge that survived service pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEdge {
    pub key: EdgeKey,
    /// Constant part of the slack: `travel(i,m) - travel(k,m) - transfer(m)`.
    pub slack_offset: i64,
    /// Window width `w`; an enabled edge needs `0 <= slack <= w - 1`.
    ///
    /// `w` is `travel(i,m)` for the first trip of line `i` and
    /// `headway(i)` for every later trip.
    pub window: i64,
    /// `flow(k, i, m)`.
    pub flow: i64,
}

impl SyncEdge {
    /// Slack for the given departure offsets of `(i, j)` and `(k, l)`.
    pub fn slack(&self, offset: i64, other_offset: i64) -> i64 {
        offset - other_offset + self.slack_offset
    }

    /// Whether `slack` lies inside the timing window.
    pub fn in_window(&self, slack: i64) -> bool {
        (0..self.window).contains(&slack)
    }

    /// Largest slack an enabled edge can carry (0 for an empty window).
    pub fn max_slack(&self) -> i64 {
        (self.window - 1).max(0)
    }

    /// Range of slack values reachable from the two trips' domains.
    pub fn slack_range(&self, trip: &TripDomain, other: &TripDomain) -> (i64, i64) {
        (
            self.slack(trip.earliest, other.latest),
            self.slack(trip.latest, other.earliest),
        )
    }
}

/// Edge enumeration counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeStats {
    /// Every `(i, j, k, l, m)` tuple considered, self-pairs included.
    pub enumerated: usize,
    /// Tuples with `i == k`.
    pub self_pairs: usize,
    /// Cross-line tuples where line `i` or `k` does not serve `m`.
    pub unserved: usize,
    /// Served tuples whose slack range misses the window.
    pub window_pruned: usize,
    /// Edges kept in the model.
    pub kept: usize,
}

impl EdgeStats {
    /// Number of cross-line candidate tuples (an upper bound on the
    /// synchronization count).
    pub fn cross_line(&self) -> usize {
        self.enumerated - self.self_pairs
    }
}

/// Sparse set of synchronization edges keyed by `(i, j, k, l, m)`.
///
/// Only cross-line edges at nodes served by both lines are stored; a
/// missing key means the edge's indicator is fixed at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: BTreeMap<EdgeKey, SyncEdge>,
    stats: EdgeStats,
}

impl EdgeSet {
    /// Enumerates and prunes the candidate edges of a network.
    pub fn build(network: &Network, trips: &TripTable, config: &SyncConfig) -> Self {
        let mut edges = BTreeMap::new();
        let mut stats = EdgeStats::default();
        let n_lines = network.line_count();
        let n_nodes = network.node_count();

        for i in 0..n_lines {
            for k in 0..n_lines {
                let pairs = trips.line(i).len() * trips.line(k).len();
                stats.enumerated += pairs * n_nodes;
                if i == k {
                    stats.self_pairs += pairs * n_nodes;
                    continue;
                }

                let (line_i, line_k) = (network.line(i), network.line(k));
                for m in 0..n_nodes {
                    let (Some(travel_i), Some(travel_k)) = (line_i.travel_time(m), line_k.travel_time(m))
                    else {
                        stats.unserved += pairs;
                        continue;
                    };
                    let slack_offset = travel_i - travel_k - network.node(m).transfer_time();
                    let flow = network.flow(k, i, m);

                    for trip in trips.line(i) {
                        let window = if trip.index == 0 {
                            travel_i
                        } else {
                            line_i.headway()
                        };
                        for other in trips.line(k) {
                            let edge = SyncEdge {
                                key: EdgeKey::new(i, trip.index, k, other.index, m),
                                slack_offset,
                                window,
                                flow,
                            };
                            if config.prune_disjoint_windows && !window_reachable(&edge, trip, other) {
                                stats.window_pruned += 1;
                                continue;
                            }
                            edges.insert(edge.key, edge);
                        }
                    }
                }
            }
        }

        stats.kept = edges.len();
        debug!(
            enumerated = stats.enumerated,
            self_pairs = stats.self_pairs,
            unserved = stats.unserved,
            window_pruned = stats.window_pruned,
            kept = stats.kept,
            "synchronization edges enumerated"
        );
        Self { edges, stats }
    }

    /// Enumeration counters.
    pub fn stats(&self) -> &EdgeStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, key: &EdgeKey) -> Option<&SyncEdge> {
        self.edges.get(key)
    }

    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Edges in key order.
    pub fn iter(&self) -> impl Iterator<Item = &SyncEdge> {
        self.edges.values()
    }

    /// Keeps only the edges for which `keep` returns true.
    ///
    /// Removed edges count as fixed at indicator 0. `stats().kept` is
    /// updated; the other counters describe the original enumeration.
    pub fn retain(&mut self, mut keep: impl FnMut(&SyncEdge) -> bool) {
        self.edges.retain(|_, edge| keep(edge));
        self.stats.kept = self.edges.len();
    }

    /// Sum of all edge flows: an upper bound on the weighted count.
    pub fn total_flow(&self) -> i64 {
        self.edges.values().map(|e| e.flow).sum()
    }

    /// Widest window over all edges.
    pub fn max_slack(&self) -> i64 {
        self.edges.values().map(SyncEdge::max_slack).max().unwrap_or(0)
    }
}

/// Whether the slack range reachable from the trips' domains meets the
/// window `[0, w - 1]`.
fn window_reachable(edge: &SyncEdge, trip: &TripDomain, other: &TripDomain) -> bool {
    let (lo, hi) = edge.slack_range(trip, other);
    edge.window > 0 && hi >= 0 && lo <= edge.window - 1
}
