//! Schedule ingestion.
//!
//! Each mode's data lives in its own directory under the data root:
//!
//! ```text
//! data/
//!   train/         stops.csv, timetables/*.csv
//!   myciti/        stops.csv, timetables/*.csv
//!   golden_arrow/  stops.csv, timetables/*.csv
//!   taxi/          stops.csv, trips.csv
//! ```
//!
//! Bad rows never fail a load: they are skipped and counted in the
//! [`LoadReport`]. A missing mode directory gives an empty network.

mod error;
mod report;
mod stops;
mod taxi;
mod timetable;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::Mode;
use crate::metrics::Observer;
use crate::network::{NetworkGraph, StopCatalog};

pub use error::IngestError;
pub use report::LoadReport;

use timetable::TimetableReader;

/// Share of malformed timetable rows above which a load is reported.
const MALFORMED_WARN_RATIO: f64 = 0.2;

/// Load one mode's network from `data_dir/<mode>`.
pub fn load_network(
    data_dir: &Path,
    mode: Mode,
    observer: &dyn Observer,
) -> Result<(NetworkGraph, LoadReport), IngestError> {
    let started = Instant::now();
    let dir = data_dir.join(mode.as_str());
    let mut report = LoadReport::new(mode);

    if !dir.is_dir() {
        warn!(mode = %mode, dir = %dir.display(), "no data directory, network will be empty");
        observer.graph_loaded(&report);
        return Ok((NetworkGraph::empty(mode), report));
    }

    let stops = stops::read_stops(&dir.join("stops.csv"), mode, &mut report)?;
    let catalog = StopCatalog::new(stops.clone());

    let trips = match mode {
        Mode::Taxi => {
            let path = dir.join("trips.csv");
            if path.is_file() {
                taxi::read_taxi_trips(&path, &catalog, &mut report)?
            } else {
                warn!(path = %path.display(), "no taxi routes");
                Vec::new()
            }
        }
        _ => {
            let mut reader = TimetableReader::new(mode, &catalog);
            for path in timetable_files(&dir.join("timetables"))? {
                if let Err(e) = reader.read(&path, &mut report) {
                    warn!(error = %e, "skipping timetable");
                }
            }
            let ratio = report.malformed_ratio(reader.rows());
            if ratio > MALFORMED_WARN_RATIO {
                warn!(
                    mode = %mode,
                    malformed = report.malformed_rows,
                    rows = reader.rows(),
                    "over {:.0}% of timetable rows were malformed",
                    MALFORMED_WARN_RATIO * 100.0
                );
            }
            reader.into_trips()
        }
    };

    let graph = NetworkGraph::new(mode, stops, trips);
    report.stops = graph.stops().len();
    report.trips = graph.trips().len();
    report.elapsed = started.elapsed();

    info!(
        mode = %mode,
        stops = report.stops,
        trips = report.trips,
        malformed = report.malformed_rows,
        missing_stops = report.missing_stops,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "loaded network"
    );
    observer.graph_loaded(&report);

    Ok((graph, report))
}

/// Load every mode in [`Mode::LOADED`].
pub fn load_all(data_dir: &Path, observer: &dyn Observer) -> Result<Vec<NetworkGraph>, IngestError> {
    Mode::LOADED
        .iter()
        .map(|&mode| load_network(data_dir, mode, observer).map(|(graph, _)| graph))
        .collect()
}

/// The `*.csv` files in `dir`, sorted by name. A missing directory has none.
fn timetable_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no timetables directory");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Metrics, NoopObserver};
    use std::fs;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn seed(root: &Path) {
        write(
            &root.join("train/stops.csv"),
            "code,name,latitude,longitude,address\n\
             CPT,Cape Town,-33.9221,18.4255,\n\
             WDS,Woodstock,-33.9275,18.4486,\n\
             BLV,Bellville,-33.9046,18.6297,\n",
        );
        write(
            &root.join("train/timetables/northern.csv"),
            "trip_id,day_type,route,Cape Town,Woodstock,Bellville\n\
             1,Monday to Friday,Northern,06:00,06:05,06:30\n\
             2,Saturday,Northern,07:00,07:05,07:30\n\
             3,Saturday,Northern,,,\n",
        );
        write(&root.join("train/timetables/README.txt"), "not a timetable");
        write(
            &root.join("taxi/stops.csv"),
            "code,name,latitude,longitude,address\n\
             ,Cape Town Rank,-33.9225,18.4240,\n\
             ,Bellville Rank,-33.9050,18.6300,\n",
        );
        write(&root.join("taxi/trips.csv"), "id,from,to\nR1,Cape Town Rank,Bellville Rank\n");
    }

    #[test]
    fn loads_scheduled_mode() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());

        let (graph, report) = load_network(dir.path(), Mode::Train, &NoopObserver).unwrap();
        assert_eq!(graph.mode(), Mode::Train);
        assert_eq!(graph.stops().len(), 3);
        assert_eq!(graph.trips().len(), 4);
        assert_eq!(report.trips, 4);
        assert_eq!(report.malformed_rows, 1);
    }

    #[test]
    fn loads_taxi_routes() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());

        let (graph, report) = load_network(dir.path(), Mode::Taxi, &NoopObserver).unwrap();
        assert_eq!(graph.trips().len(), 1);
        assert!(graph.trips()[0].is_on_demand());
        assert_eq!(report.stops, 2);
    }

    #[test]
    fn missing_mode_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (graph, report) = load_network(dir.path(), Mode::MyCiti, &NoopObserver).unwrap();
        assert!(graph.stops().is_empty());
        assert_eq!(report.trips, 0);
    }

    #[test]
    fn missing_stops_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("myciti")).unwrap();
        assert!(load_network(dir.path(), Mode::MyCiti, &NoopObserver).is_err());
    }

    #[test]
    fn load_all_reports_every_mode() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let metrics = Metrics::new();

        let graphs = load_all(dir.path(), &metrics).unwrap();
        let modes: Vec<Mode> = graphs.iter().map(|g| g.mode()).collect();
        assert_eq!(modes, Mode::LOADED.to_vec());
        assert_eq!(metrics.snapshot().loads.len(), 4);
    }
}
