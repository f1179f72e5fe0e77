//! Solver-independent model layer.
//!
//! Provides the abstract backend contract the synchronization builder is
//! written against, plus an in-memory record of a model.
//!
//! # Key Components
//!
//! - **Variables**: [`VarId`] handles, [`VarInfo`] metadata
//! - **Expressions**: [`LinearExpr`], [`Comparator`], [`Sense`]
//! - **Contract**: [`ModelBuilder`] and [`SolverBackend`] traits
//! - **Record**: [`LinearModel`], with CPLEX LP export
//!
//! # Design
//!
//! All coefficients and bounds are integers: times are whole minutes and
//! flows whole passengers, so a carried objective value can be re-imposed
//! as an exact equality. Concrete engines (OR-Tools, Gurobi, an LP file
//! handed to SCIP) plug in by implementing [`SolverBackend`].

mod expr;
mod lp;
#[allow(clippy::module_inception)]
mod model;
mod solver;
mod variables;

pub use expr::{Comparator, LinearConstraint, LinearExpr, Sense};
pub use model::{LinearModel, Objective};
pub use solver::{ModelBuilder, SolveStatus, Solution, SolverBackend, SolverError};
pub use variables::{VarId, VarInfo, VarKind};
