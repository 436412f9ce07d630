//! Trips: directed edges between two stops.

use std::fmt;
use std::sync::Arc;

use crate::router::TimetableEntry;

use super::{ClockTime, DayType, DomainError, Mode, RouteLabel, Stop};

/// A single scheduled or on-demand hop between two stops.
///
/// Scheduled trips leave at a fixed time of day on one day type. On-demand
/// trips (walking transfers, taxis) have no departure time: they can be
/// taken as soon as the traveller reaches the origin stop, on any day.
#[derive(Clone)]
pub struct Trip {
    from: Arc<Stop>,
    to: Arc<Stop>,
    departure: Option<ClockTime>,
    duration_mins: u32,
    day_type: DayType,
    mode: Mode,
    trip_id: Option<String>,
    route: Option<String>,
}

impl Trip {
    /// Create a scheduled trip.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transit_server::domain::{ClockTime, DayType, Mode, Stop, Trip};
    ///
    /// let a = Arc::new(Stop::new("A", 0.0, 0.0, Mode::Train).unwrap());
    /// let b = Arc::new(Stop::new("B", 0.0, 0.1, Mode::Train).unwrap());
    /// let dep = ClockTime::parse_hhmm("23:50").unwrap();
    ///
    /// let trip = Trip::scheduled(a, b, dep, 20, DayType::Weekday, Mode::Train).unwrap();
    /// assert_eq!(trip.arrival().unwrap().to_string(), "00:10");
    /// ```
    pub fn scheduled(
        from: Arc<Stop>,
        to: Arc<Stop>,
        departure: ClockTime,
        duration_mins: u32,
        day_type: DayType,
        mode: Mode,
    ) -> Result<Self, DomainError> {
        Self::build(from, to, Some(departure), duration_mins, day_type, mode)
    }

    /// Create an on-demand trip with no fixed departure time.
    pub fn on_demand(
        from: Arc<Stop>,
        to: Arc<Stop>,
        duration_mins: u32,
        mode: Mode,
    ) -> Result<Self, DomainError> {
        Self::build(from, to, None, duration_mins, DayType::Weekday, mode)
    }

    fn build(
        from: Arc<Stop>,
        to: Arc<Stop>,
        departure: Option<ClockTime>,
        duration_mins: u32,
        day_type: DayType,
        mode: Mode,
    ) -> Result<Self, DomainError> {
        if duration_mins < 1 {
            return Err(DomainError::InvalidDuration(duration_mins));
        }
        Ok(Self {
            from,
            to,
            departure,
            duration_mins,
            day_type,
            mode,
            trip_id: None,
            route: None,
        })
    }

    /// Attach a trip identifier.
    pub fn with_trip_id(mut self, trip_id: impl Into<String>) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }

    /// Attach a route label.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        let route = route.into();
        if !route.trim().is_empty() {
            self.route = Some(route.trim().to_string());
        }
        self
    }

    pub fn from(&self) -> &Arc<Stop> {
        &self.from
    }

    pub fn to(&self) -> &Arc<Stop> {
        &self.to
    }

    /// Departure time of day, or `None` for on-demand trips.
    pub fn departure(&self) -> Option<ClockTime> {
        self.departure
    }

    /// Arrival time of day, wrapping past midnight.
    pub fn arrival(&self) -> Option<ClockTime> {
        self.departure
            .map(|dep| ClockTime::from_minutes_wrapping(dep.minutes() + self.duration_mins))
    }

    pub fn duration_mins(&self) -> u32 {
        self.duration_mins
    }

    pub fn day_type(&self) -> DayType {
        self.day_type
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.trip_id.as_deref()
    }

    pub fn is_on_demand(&self) -> bool {
        self.departure.is_none()
    }
}

impl RouteLabel for Trip {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn route_label(&self) -> Option<&str> {
        self.route.as_deref()
    }
}

impl TimetableEntry for Trip {
    type Stop = Arc<Stop>;

    fn departure_stop(&self) -> &Arc<Stop> {
        &self.from
    }

    fn destination_stop(&self) -> &Arc<Stop> {
        &self.to
    }

    fn departure_time(&self) -> Option<ClockTime> {
        self.departure
    }

    fn duration_mins(&self) -> u32 {
        self.duration_mins
    }

    fn day_type(&self) -> DayType {
        self.day_type
    }
}

impl PartialEq for Trip {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.departure == other.departure
            && self.trip_id == other.trip_id
    }
}

impl Eq for Trip {}

impl fmt::Debug for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dep = self
            .departure
            .map(|d| d.to_string())
            .unwrap_or_else(|| "immediate".to_string());
        write!(
            f,
            "Trip({} -> {} at {} for {}m, {} {})",
            self.from.name(),
            self.to.name(),
            dep,
            self.duration_mins,
            self.mode,
            self.day_type
        )
    }
}
