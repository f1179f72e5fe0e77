//! Synchronization edge builder.
//!
//! Enumerates the candidate transfers `(i, j, k, l, m)` between trips of
//! different lines at shared nodes, prunes those that can never fall in
//! their timing window, and writes one self-contained integer model per
//! optimization stage.
//!
//! # Timing linearization
//!
//! For an edge with slack `S` and window width `w` (the line's travel
//! time to the node for its first trip, its headway afterwards), the
//! indicator `y` may be 1 only if `0 <= S <= w - 1`. The disjunction is
//! written with a big-M pair that is vacuous when `y = 0`.
//!
//! Secondary stages add an auxiliary variable equal to `S` when the edge
//! is enabled and 0 otherwise.
//!
//! # References
//!
//! - Ceder, A., Golany, B., Tal, O. (2001). "Creating bus timetables with
//!   maximal synchronization", *Transportation Research Part A* 35(10).

mod builder;
mod config;
mod edges;

pub use builder::{EdgeVars, SyncModelBuilder, SyncObjective, SyncVars};
pub use config::SyncConfig;
pub use edges::{EdgeKey, EdgeSet, EdgeStats, SyncEdge};
