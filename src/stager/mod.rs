//! Lexicographic objective stager.
//!
//! Runs the stages in priority order, each on its own backend instance:
//!
//! | Stage | Objective | Extra constraint |
//! |-------|-----------|------------------|
//! | [`Stage::Count`] | max enabled edges | none |
//! | [`Stage::WeightedCount`] | max flow-weighted enabled edges | none |
//! | [`Stage::TotalImbalance`] | min flow-weighted slack | weighted count `== p` |
//! | [`Stage::WorstWait`] | min largest slack | weighted count `== p` |
//!
//! `p` is the weighted-count stage's value. It is re-imposed as an
//! equality, so the secondary stages never trade away synchronized flow.
//! When the weighted stage stops on its time budget, `p` is only a lower
//! bound and is reported with [`Provenance::BestKnown`].
//!
//! The two secondary stages are alternatives built on the same `p`; with
//! the `parallel` feature they can run concurrently.

mod config;
mod error;
mod runner;
mod types;

pub use config::{Secondary, StagerConfig};
pub use error::StageError;
pub use runner::LexStager;
pub use types::{CarriedValue, Halt, PipelineReport, Provenance, Schedule, Stage, StageResult};
