//! Shared test networks.

use crate::network::{Network, NetworkData};

const UNSERVED: i64 = 10_000;

/// Four lines, four nodes, horizon 30. Every node is shared by exactly
/// two lines; lines 0 and 1 never meet.
pub(crate) fn small_network_data() -> NetworkData {
    NetworkData::from_sentinel_matrix(
        vec![10, 10, 10, 20],
        &[
            vec![5, 12, UNSERVED, UNSERVED],
            vec![UNSERVED, UNSERVED, 10, 4],
            vec![6, UNSERVED, UNSERVED, 9],
            vec![UNSERVED, 5, 13, UNSERVED],
        ],
        UNSERVED,
        vec![0, 0, 0, 0],
        30,
    )
    .with_flow(2, 0, 0, 30)
    .with_flow(0, 2, 0, 10)
    .with_flow(3, 0, 1, 25)
    .with_flow(1, 3, 2, 15)
    .with_flow(3, 1, 2, 5)
    .with_flow(2, 1, 3, 20)
}

pub(crate) fn small_network() -> Network {
    Network::new(small_network_data()).unwrap()
}

/// Two lines serving disjoint nodes.
pub(crate) fn disjoint_network() -> Network {
    let data = NetworkData::from_sentinel_matrix(
        vec![10, 15],
        &[vec![4, UNSERVED], vec![UNSERVED, 7]],
        UNSERVED,
        vec![1, 1],
        30,
    )
    .with_flow(0, 1, 0, 50);
    Network::new(data).unwrap()
}

/// Eleven lines, eighteen nodes, horizon 240, no flows.
pub(crate) fn large_network_data() -> NetworkData {
    const U: i64 = UNSERVED;
    NetworkData::from_sentinel_matrix(
        vec![10, 10, 15, 25, 20, 11, 15, 10, 14, 17, 24],
        &[
            vec![U, U, 19, 24, U, 32, U, 36, U, 45, U, U, U, U, U, U, U, U],
            vec![U, U, 42, 37, U, 29, U, 25, 23, U, 1000, U, U, U, U, U, U, U],
            vec![U, U, U, U, U, U, U, U, U, U, 18, 42, 58, U, U, U, U, 51],
            vec![U, U, U, U, U, U, U, U, U, 90, 72, U, 14, 26, 22, U, 49, U],
            vec![U, 17, 22, U, 34, U, U, U, U, U, U, U, U, U, U, U, U, U],
            vec![37, 17, 26, 31, U, U, U, U, U, U, U, U, U, U, U, U, U, U],
            vec![U, U, U, U, 61, 53, 51, U, U, U, U, U, U, U, U, U, U, U],
            vec![U, U, U, U, U, U, 55, U, 48, U, 21, U, U, U, U, U, U, U],
            vec![U, U, U, U, U, U, U, U, U, U, U, U, U, 16, 20, 32, U, U],
            vec![U, U, U, U, U, U, U, U, U, U, U, U, U, U, U, 20, U, U],
            vec![U, U, U, U, U, U, U, U, U, U, U, 20, 28, U, U, U, U, U],
        ],
        U,
        vec![4, 3, 2, 6, 0, 2, 7, 0, 6, 0, 1, 1, 0, 0, 1, 12, 11, 3],
        240,
    )
}
