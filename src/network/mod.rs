//! Network model: lines, transfer nodes and passenger flows.
//!
//! [`NetworkData`] is the raw record a loader produces; [`Network`] is the
//! validated, read-only form every later component consumes. Validation
//! rejects malformed input (non-positive headways, ragged travel-time
//! tables, out-of-range flow indices, values beyond [`MAX_MAGNITUDE`])
//! before any solver variable exists.

mod data;
mod error;
mod model;

pub use data::{FlowEntry, NetworkData};
pub use error::NetworkError;
pub use model::{Line, Network, TransferNode, MAX_BIG_M, MAX_MAGNITUDE};
