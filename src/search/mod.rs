//! Bundled exact backend.
//!
//! [`DfsSolver`] implements [`SolverBackend`](crate::model::SolverBackend)
//! with bounds propagation and depth-first branch & bound, so the staged
//! optimization can run without an external MILP engine. It is exact:
//! an exhausted search proves optimality or infeasibility; a search cut
//! short by the time budget or node limit reports its incumbent as
//! feasible only.
//!
//! # References
//!
//! - Apt (2003), "Principles of Constraint Programming", ch. 6 (bounds consistency)
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

mod config;
mod propagate;
mod runner;

pub use config::SearchConfig;
pub use runner::DfsSolver;
