//! Network validation errors.

/// Configuration errors detected while validating network input.
///
/// All of these are raised before any solver variable is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("line {line}: headway must be positive, got {headway}")]
    NonPositiveHeadway { line: usize, headway: i64 },

    #[error("horizon must be non-negative, got {0}")]
    NegativeHorizon(i64),

    #[error("line {line}: expected {expected} travel times (one per node), got {found}")]
    RaggedTravelTimes {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, node {node}: travel time must be non-negative, got {value}")]
    NegativeTravelTime { line: usize, node: usize, value: i64 },

    #[error("expected {expected} travel-time rows (one per line), got {found}")]
    TravelTimeRows { expected: usize, found: usize },

    #[error("node {node}: transfer time must be non-negative, got {value}")]
    NegativeTransferTime { node: usize, value: i64 },

    #[error("flow ({from} -> {to} at node {node}) references an index out of range")]
    FlowIndexOutOfRange { from: usize, to: usize, node: usize },

    #[error("flow ({from} -> {to} at node {node}) must be non-negative, got {volume}")]
    NegativeFlow {
        from: usize,
        to: usize,
        node: usize,
        volume: i64,
    },

    #[error("big-M {big_m} is too small, need at least {required}")]
    BigMTooSmall { big_m: i64, required: i64 },

    #[error("{what} {value} exceeds the supported maximum {limit}")]
    ValueTooLarge {
        what: &'static str,
        value: i64,
        limit: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetworkError::NonPositiveHeadway { line: 2, headway: 0 };
        assert_eq!(err.to_string(), "line 2: headway must be positive, got 0");

        let err = NetworkError::RaggedTravelTimes {
            line: 1,
            expected: 4,
            found: 3,
        };
        assert!(err.to_string().contains("expected 4 travel times"));

        let err = NetworkError::BigMTooSmall {
            big_m: 10,
            required: 61,
        };
        assert_eq!(err.to_string(), "big-M 10 is too small, need at least 61");

        let err = NetworkError::ValueTooLarge {
            what: "horizon",
            value: 5,
            limit: 4,
        };
        assert_eq!(err.to_string(), "horizon 5 exceeds the supported maximum 4");
    }
}
