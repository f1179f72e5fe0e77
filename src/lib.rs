//! Transit departure synchronization.
//!
//! Builds integer models that choose the first departure of every line so
//! that as many passengers as possible find their connecting trip waiting
//! within one service cycle, then refines that optimum lexicographically:
//!
//! - **Network**: [`network`] — lines, transfer nodes, flows, validation.
//! - **Trips**: [`trips`] — headway expansion into time-windowed trips.
//! - **Model**: [`model`] — solver-agnostic linear model contract and LP export.
//! - **Search**: [`search`] — bundled exact branch & bound backend.
//! - **Synchronization**: [`sync`] — candidate transfer edges and the big-M
//!   stage model builder.
//! - **Stager**: [`stager`] — the four lexicographic stages.
//!
//! # Architecture
//!
//! Model construction is written once against [`model::ModelBuilder`];
//! any MILP or CP engine plugs in through a thin
//! [`model::SolverBackend`] adapter. The crate carries no
//! engine-specific code besides the bundled search.

pub mod model;
pub mod network;
pub mod search;
pub mod stager;
pub mod sync;
pub mod trips;

#[cfg(test)]
pub(crate) mod fixtures;
