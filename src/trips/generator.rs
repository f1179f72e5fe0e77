//! Headway expansion into time-windowed trips.

use crate::network::{Network, NetworkError};

/// Departure-offset domain of one trip.
///
/// Trip `index` of a line with headway `h` may depart anywhere in
/// `[index * h, min((index + 1) * h, horizon)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripDomain {
    /// Line id.
    pub line: usize,
    /// Position of the trip within the horizon.
    pub index: usize,
    /// Earliest departure offset.
    pub earliest: i64,
    /// Latest departure offset.
    pub latest: i64,
}

/// Headway recurrence between two adjacent trips of a line:
/// `offset[later] - offset[earlier] == headway`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub line: usize,
    pub earlier: usize,
    pub later: usize,
    pub headway: i64,
}

/// Number of trips a line runs within `horizon`: `ceil(horizon / headway)`.
pub fn trip_count(headway: i64, horizon: i64) -> Result<usize, NetworkError> {
    check(0, headway, horizon)?;
    Ok(count(headway, horizon))
}

/// Generates the ordered trip domains for one line.
///
/// # Examples
///
/// ```
/// use u_transync::trips::generate;
///
/// let trips = generate(3, 20, 30).unwrap();
/// assert_eq!(trips.len(), 2);
/// assert_eq!((trips[0].earliest, trips[0].latest), (0, 20));
/// assert_eq!((trips[1].earliest, trips[1].latest), (20, 30));
/// ```
pub fn generate(line: usize, headway: i64, horizon: i64) -> Result<Vec<TripDomain>, NetworkError> {
    check(line, headway, horizon)?;
    Ok(domains(line, headway, horizon))
}

fn check(line: usize, headway: i64, horizon: i64) -> Result<(), NetworkError> {
    if headway <= 0 {
        return Err(NetworkError::NonPositiveHeadway { line, headway });
    }
    if horizon < 0 {
        return Err(NetworkError::NegativeHorizon(horizon));
    }
    Ok(())
}

fn count(headway: i64, horizon: i64) -> usize {
    (horizon / headway + i64::from(horizon % headway != 0)) as usize
}

fn domains(line: usize, headway: i64, horizon: i64) -> Vec<TripDomain> {
    (0..count(headway, horizon))
        .map(|index| {
            let earliest = index as i64 * headway;
            TripDomain {
                line,
                index,
                earliest,
                latest: earliest.saturating_add(headway).min(horizon),
            }
        })
        .collect()
}

/// Trips of every line in a network.
///
/// Computed once per network and shared read-only by every stage model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTable {
    lines: Vec<Vec<TripDomain>>,
    headways: Vec<i64>,
}

impl TripTable {
    /// Expands every line of a validated network.
    pub fn new(network: &Network) -> Self {
        let horizon = network.horizon();
        let lines = network
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| domains(i, line.headway(), horizon))
            .collect();
        let headways = network.lines().iter().map(|l| l.headway()).collect();
        Self { lines, headways }
    }

    /// Trips of line `i`, in departure order.
    pub fn line(&self, i: usize) -> &[TripDomain] {
        &self.lines[i]
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Trip count per line.
    pub fn counts(&self) -> Vec<usize> {
        self.lines.iter().map(Vec::len).collect()
    }

    /// Total number of trips over all lines.
    pub fn total(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// All trips, line by line.
    pub fn iter(&self) -> impl Iterator<Item = &TripDomain> {
        self.lines.iter().flatten()
    }

    /// Headway recurrences between adjacent trips of every line.
    pub fn recurrences(&self) -> impl Iterator<Item = Recurrence> + '_ {
        self.lines.iter().enumerate().flat_map(move |(line, trips)| {
            let headway = self.headways[line];
            trips.windows(2).map(move |pair| Recurrence {
                line,
                earlier: pair[0].index,
                later: pair[1].index,
                headway,
            })
        })
    }
}
