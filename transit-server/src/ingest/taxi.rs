//! Minibus taxi routes.
//!
//! Taxis run without a timetable, so each route in `trips.csv` becomes an
//! on-demand trip whose duration is estimated from the distance between its
//! end points.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::domain::{Mode, Trip};
use crate::network::StopCatalog;

use super::IngestError;
use super::report::LoadReport;

#[derive(Debug, Deserialize)]
struct TaxiRecord {
    #[serde(default)]
    id: Option<String>,
    from: String,
    to: String,
}

/// Estimated minutes for a taxi ride of `distance_km`: about a kilometre a
/// minute, never less than one minute.
pub(crate) fn taxi_minutes(distance_km: f64) -> u32 {
    let mins = distance_km.round();
    if mins.is_finite() && mins >= 1.0 {
        mins as u32
    } else {
        1
    }
}

pub(super) fn read_taxi_trips(
    path: &Path,
    catalog: &StopCatalog,
    report: &mut LoadReport,
) -> Result<Vec<Arc<Trip>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, e))?;

    let mut trips = Vec::new();
    for (row, record) in reader.deserialize::<TaxiRecord>().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                trace!(path = %path.display(), row, error = %e, "skipping unreadable taxi row");
                report.malformed_rows += 1;
                continue;
            }
        };

        let (Some(from), Some(to)) = (catalog.resolve(&record.from), catalog.resolve(&record.to)) else {
            trace!(from = %record.from, to = %record.to, "taxi route names an unknown stop");
            report.missing_stops += 1;
            continue;
        };
        if from == to {
            report.malformed_rows += 1;
            continue;
        }

        let minutes = taxi_minutes(from.distance_km_to(to));
        let Ok(trip) = Trip::on_demand(from.clone(), to.clone(), minutes, Mode::Taxi) else {
            report.malformed_rows += 1;
            continue;
        };
        let trip = match record.id {
            Some(id) => trip.with_trip_id(id),
            None => trip,
        };
        trips.push(Arc::new(trip.with_route("Taxi")));
    }

    Ok(trips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stop;
    use std::io::Write;

    fn catalog() -> StopCatalog {
        let stop = |name: &str, lat, lon| Arc::new(Stop::new(name, lat, lon, Mode::Taxi).unwrap());
        StopCatalog::new(vec![
            stop("Cape Town Taxi Rank", -33.9225, 18.4240),
            stop("Bellville Taxi Rank", -33.9050, 18.6300),
        ])
    }

    #[test]
    fn minutes_from_distance() {
        assert_eq!(taxi_minutes(0.2), 1);
        assert_eq!(taxi_minutes(18.6), 19);
        assert_eq!(taxi_minutes(f64::NAN), 1);
    }

    #[test]
    fn reads_routes_as_on_demand_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "id,from,to\n\
             R1,Cape Town Taxi Rank,Bellville Taxi Rank\n\
             R2,Cape Town Taxi Rank,Khayelitsha\n\
             R3,Bellville Taxi Rank,Bellville Taxi Rank\n"
        )
        .unwrap();

        let catalog = catalog();
        let mut report = LoadReport::new(Mode::Taxi);
        let trips = read_taxi_trips(file.path(), &catalog, &mut report).unwrap();

        assert_eq!(trips.len(), 1);
        assert!(trips[0].is_on_demand());
        assert_eq!(trips[0].trip_id(), Some("R1"));
        assert!((18..=20).contains(&trips[0].duration_mins()));
        assert_eq!(report.missing_stops, 1);
        assert_eq!(report.malformed_rows, 1);
    }
}
