//! Journey types.
//!
//! A `Journey` is the planner's answer: an ordered list of trips taking the
//! traveller from the source stop to the destination stop.

use std::sync::Arc;

use super::{ClockTime, DomainError, RouteLabel, Stop, Trip};

/// How transfers are counted for a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferPolicy {
    /// Every boarding after the first is a transfer.
    #[default]
    LegCount,
    /// Only a change of mode, or of route within the same mode, is a
    /// transfer. Consecutive legs of one service count as one ride.
    ModeOrRouteChange,
}

impl TransferPolicy {
    /// Count transfers in an ordered leg sequence.
    ///
    /// ```
    /// use transit_server::domain::TransferPolicy;
    ///
    /// let legs: Vec<transit_server::domain::Trip> = Vec::new();
    /// assert_eq!(TransferPolicy::LegCount.count(&legs), 0);
    /// ```
    pub fn count<L: RouteLabel>(&self, legs: &[L]) -> usize {
        match self {
            TransferPolicy::LegCount => legs.len().saturating_sub(1),
            TransferPolicy::ModeOrRouteChange => legs
                .windows(2)
                .filter(|pair| {
                    let (prev, next) = (&pair[0], &pair[1]);
                    if prev.mode() != next.mode() {
                        return true;
                    }
                    match (prev.route_label(), next.route_label()) {
                        (Some(a), Some(b)) => a != b,
                        _ => false,
                    }
                })
                .count(),
        }
    }
}

/// A complete itinerary from source to destination.
#[derive(Debug, Clone)]
pub struct Journey {
    source: Arc<Stop>,
    destination: Arc<Stop>,
    legs: Vec<Arc<Trip>>,
    departure: ClockTime,
    arrival: ClockTime,
    duration_mins: u32,
    transfers: usize,
}

impl Journey {
    /// Creates a journey, validating that the legs form a gapless chain from
    /// `source` to `destination`.
    ///
    /// A journey whose source is its destination has no legs.
    pub fn new(
        source: Arc<Stop>,
        destination: Arc<Stop>,
        legs: &[Arc<Trip>],
        departure: ClockTime,
        duration_mins: u32,
        policy: TransferPolicy,
    ) -> Result<Self, DomainError> {
        match (legs.first(), legs.last()) {
            (Some(first), Some(last)) => {
                if first.from() != &source {
                    return Err(DomainError::EndpointMismatch {
                        expected: source.name().to_string(),
                        found: first.from().name().to_string(),
                    });
                }
                if last.to() != &destination {
                    return Err(DomainError::EndpointMismatch {
                        expected: destination.name().to_string(),
                        found: last.to().name().to_string(),
                    });
                }
            }
            _ if source != destination => return Err(DomainError::EmptyJourney),
            _ => {}
        }

        for pair in legs.windows(2) {
            if pair[0].to() != pair[1].from() {
                return Err(DomainError::LegsNotConnected(
                    pair[1].from().name().to_string(),
                    pair[0].to().name().to_string(),
                ));
            }
        }

        Ok(Self {
            transfers: policy.count(legs),
            arrival: ClockTime::from_minutes_wrapping(departure.minutes() + duration_mins),
            source,
            destination,
            legs: legs.to_vec(),
            departure,
            duration_mins,
        })
    }

    pub fn source(&self) -> &Arc<Stop> {
        &self.source
    }

    pub fn destination(&self) -> &Arc<Stop> {
        &self.destination
    }

    pub fn legs(&self) -> &[Arc<Trip>] {
        &self.legs
    }

    /// Requested departure time.
    pub fn departure(&self) -> ClockTime {
        self.departure
    }

    /// Wall-clock arrival at the destination.
    pub fn arrival(&self) -> ClockTime {
        self.arrival
    }

    /// Minutes from the requested departure to arrival.
    pub fn duration_mins(&self) -> u32 {
        self.duration_mins
    }

    pub fn transfers(&self) -> usize {
        self.transfers
    }

    /// Returns true if the journey arrives on the day after it departs.
    pub fn arrives_next_day(&self) -> bool {
        self.departure.minutes() + self.duration_mins >= super::MINUTES_PER_DAY
    }
}
