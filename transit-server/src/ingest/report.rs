//! Per-mode load statistics.

use std::time::Duration;

use serde::Serialize;

use crate::domain::Mode;

/// What happened while loading one mode's schedule data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub mode: Mode,
    pub stops: usize,
    pub trips: usize,
    /// Rows that could not be turned into stops or trips.
    pub malformed_rows: usize,
    /// Stop names in timetables that matched no known stop.
    pub missing_stops: usize,
    /// Trips identical to one already loaded.
    pub duplicate_trips: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl LoadReport {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            stops: 0,
            trips: 0,
            malformed_rows: 0,
            missing_stops: 0,
            duplicate_trips: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Fraction of rows seen that were malformed.
    pub fn malformed_ratio(&self, rows: usize) -> f64 {
        if rows == 0 {
            0.0
        } else {
            self.malformed_rows as f64 / rows as f64
        }
    }
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
