//! `stops.csv` reader.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::domain::{Mode, Stop};

use super::IngestError;
use super::report::LoadReport;

/// One row of `stops.csv`.
#[derive(Debug, Deserialize)]
struct StopRecord {
    #[serde(default)]
    code: Option<String>,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    address: Option<String>,
    /// Route tokens separated by `|`.
    #[serde(default)]
    routes: Option<String>,
}

impl StopRecord {
    fn into_stop(self, mode: Mode) -> Option<Stop> {
        let mut stop = Stop::new(self.name, self.latitude, self.longitude, mode).ok()?;
        if let Some(code) = self.code {
            stop = stop.with_code(code);
        }
        if let Some(address) = self.address {
            stop = stop.with_address(address);
        }
        if let Some(routes) = self.routes {
            stop = stop.with_routes(routes.split('|'));
        }
        Some(stop)
    }
}

/// Read every valid stop from `path`.
///
/// Invalid rows are counted as malformed and duplicates of an earlier stop
/// are dropped.
pub(super) fn read_stops(
    path: &Path,
    mode: Mode,
    report: &mut LoadReport,
) -> Result<Vec<Arc<Stop>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, e))?;

    let mut seen = HashSet::new();
    let mut stops = Vec::new();

    for (row, record) in reader.deserialize::<StopRecord>().enumerate() {
        let stop = match record {
            Ok(record) => record.into_stop(mode),
            Err(e) => {
                trace!(path = %path.display(), row, error = %e, "skipping unreadable stop row");
                None
            }
        };
        let Some(stop) = stop else {
            report.malformed_rows += 1;
            continue;
        };

        let stop = Arc::new(stop);
        if seen.insert(stop.clone()) {
            stops.push(stop);
        } else {
            trace!(stop = stop.name(), "skipping duplicate stop");
        }
    }

    report.stops = stops.len();
    Ok(stops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_stops_with_optional_columns() {
        let file = write(
            "code,name,latitude,longitude,address,routes\n\
             CIV,Civic Centre,-33.9205,18.4265,Hertzog Blvd,T01|A01\n\
             ,Adderley,-33.9230,18.4230,,\n",
        );
        let mut report = LoadReport::new(Mode::MyCiti);
        let stops = read_stops(file.path(), Mode::MyCiti, &mut report).unwrap();

        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].code(), Some("CIV"));
        assert_eq!(stops[0].address(), Some("Hertzog Blvd"));
        assert_eq!(stops[0].route_codes(), ["T01".to_string(), "A01".to_string()]);
        assert_eq!(stops[0].mode(), Mode::MyCiti);
        assert_eq!(stops[1].code(), None);
        assert_eq!(report.stops, 2);
        assert_eq!(report.malformed_rows, 0);
    }

    #[test]
    fn routes_column_is_optional() {
        let file = write("code,name,latitude,longitude,address\nCT,Cape Town,-33.9221,18.4255,\n");
        let mut report = LoadReport::new(Mode::Train);
        let stops = read_stops(file.path(), Mode::Train, &mut report).unwrap();
        assert_eq!(stops.len(), 1);
        assert!(stops[0].route_codes().is_empty());
    }

    #[test]
    fn bad_rows_counted_and_duplicates_dropped() {
        let file = write(
            "code,name,latitude,longitude,address\n\
             A,Alpha,-33.9,18.4,\n\
             B,,-33.9,18.4,\n\
             C,Gamma,north,18.4,\n\
             D,Delta,-133.9,18.4,\n\
             A,ALPHA,-33.91,18.41,\n",
        );
        let mut report = LoadReport::new(Mode::GoldenArrow);
        let stops = read_stops(file.path(), Mode::GoldenArrow, &mut report).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(report.malformed_rows, 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = LoadReport::new(Mode::Train);
        let err = read_stops(&dir.path().join("stops.csv"), Mode::Train, &mut report).unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }));
    }
}
