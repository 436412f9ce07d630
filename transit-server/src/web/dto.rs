//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Journey, RouteLabel, Stop, Trip};
use crate::metrics::MetricsSnapshot;

/// Query for `/stops/search`.
#[derive(Debug, Deserialize)]
pub struct StopSearchQuery {
    /// Free-text stop name
    pub q: String,

    /// Scope name (defaults to `all`)
    pub scope: Option<String>,

    pub limit: Option<usize>,
}

/// Query for `/stops/nearest`.
#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
    pub scope: Option<String>,
    pub limit: Option<usize>,
}

/// Query for `/journey/plan`.
#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    /// Source stop name or code
    pub from: String,

    /// Destination stop name or code
    pub to: String,

    /// Departure time in HH:MM format
    pub time: String,

    /// Day type (defaults to weekday)
    pub day: Option<String>,

    /// Round limit for the round-based router
    pub rounds: Option<usize>,

    /// `round_based` or `connection_scan`
    pub algorithm: Option<String>,

    pub scope: Option<String>,
}

/// A stop in responses.
#[derive(Debug, Serialize)]
pub struct StopDto {
    pub name: String,
    pub code: Option<String>,
    pub mode: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,

    /// Distance from the query point, for nearest-stop results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl StopDto {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            name: stop.name().to_string(),
            code: stop.code().map(str::to_string),
            mode: stop.mode().to_string(),
            latitude: stop.latitude(),
            longitude: stop.longitude(),
            address: stop.address().map(str::to_string),
            distance_km: None,
        }
    }

    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }
}

/// Response for the stop endpoints.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub stops: Vec<StopDto>,
}

/// A leg of a journey.
#[derive(Debug, Serialize)]
pub struct LegDto {
    pub from: String,
    pub to: String,

    /// Departure time, or `immediate` for walking and taxi legs
    pub departure: String,

    /// Arrival time, absent for walking and taxi legs
    pub arrival: Option<String>,

    pub duration: u32,
    pub mode: String,
    pub route: Option<String>,
    pub trip_id: Option<String>,
}

impl LegDto {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            from: trip.from().name().to_string(),
            to: trip.to().name().to_string(),
            departure: trip
                .departure()
                .map_or_else(|| "immediate".to_string(), |t| t.to_string()),
            arrival: trip.arrival().map(|t| t.to_string()),
            duration: trip.duration_mins(),
            mode: trip.mode().to_string(),
            route: trip.route_label().map(str::to_string),
            trip_id: trip.trip_id().map(str::to_string),
        }
    }
}

/// A planned journey.
#[derive(Debug, Serialize)]
pub struct JourneyDto {
    pub from: StopDto,
    pub to: StopDto,
    pub departure: String,
    pub arrival: String,

    /// Total minutes including waiting
    pub duration: u32,
    pub transfers: usize,
    pub next_day: bool,
    pub legs: Vec<LegDto>,
}

impl JourneyDto {
    pub fn from_journey(journey: &Journey) -> Self {
        Self {
            from: StopDto::from_stop(journey.source()),
            to: StopDto::from_stop(journey.destination()),
            departure: journey.departure().to_string(),
            arrival: journey.arrival().to_string(),
            duration: journey.duration_mins(),
            transfers: journey.transfers(),
            next_day: journey.arrives_next_day(),
            legs: journey.legs().iter().map(|leg| LegDto::from_trip(leg)).collect(),
        }
    }
}

/// Response for `/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,

    /// Entries in the journey cache
    pub cached_journeys: u64,
}

/// Response for `/admin/reload`.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,

    /// Stops in the combined network after the reload
    pub stops: usize,
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}
