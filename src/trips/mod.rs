//! Trip generation.
//!
//! Each line's headway is expanded into `ceil(horizon / headway)` trips,
//! each with a departure-offset domain. Adjacent trips are tied together
//! by a headway recurrence, so a line's schedule is a pure headway
//! sequence shifted by a single free offset and bounded by the horizon.

mod generator;

pub use generator::{generate, trip_count, Recurrence, TripDomain, TripTable};
