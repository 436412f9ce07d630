//! Router output.

use crate::domain::{ClockTime, MINUTES_PER_DAY};

/// An earliest-arrival route found by either router.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult<T> {
    legs: Vec<T>,
    departure_minutes: u32,
    arrival_minutes: u32,
}

impl<T> RouteResult<T> {
    pub(crate) fn new(legs: Vec<T>, departure_minutes: u32, arrival_minutes: u32) -> Self {
        Self {
            legs,
            departure_minutes,
            arrival_minutes,
        }
    }

    /// Legs in travel order. Empty when source and target coincide.
    pub fn legs(&self) -> &[T] {
        &self.legs
    }

    /// Requested departure as a time of day.
    pub fn departure(&self) -> ClockTime {
        ClockTime::from_minutes_wrapping(self.departure_minutes)
    }

    /// Arrival in absolute minutes, which exceeds one day for routes that
    /// arrive after midnight.
    pub fn arrival_minutes(&self) -> u32 {
        self.arrival_minutes
    }

    /// Arrival as a time of day.
    pub fn arrival(&self) -> ClockTime {
        ClockTime::from_minutes_wrapping(self.arrival_minutes)
    }

    /// Minutes between the requested departure and arrival.
    pub fn elapsed_mins(&self) -> u32 {
        let diff = i64::from(self.arrival_minutes) - i64::from(self.departure_minutes);
        if diff < 0 {
            (diff + i64::from(MINUTES_PER_DAY)) as u32
        } else {
            diff as u32
        }
    }

    /// Boardings after the first.
    pub fn transfers(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }
}
