//! Wide timetable reader.
//!
//! Published timetables list one trip per row and one stop per column:
//!
//! ```text
//! trip_id,day_type,direction,route,Cape Town,Woodstock,Salt River,Bellville
//! 0101,Monday to Friday,OUTBOUND,Northern,06:00,06:04,via,06:31
//! ```
//!
//! The `trip_id`, `day_type`, `direction` and `route` columns are
//! recognised by name and may appear anywhere; every other column names a
//! stop. Each pair of consecutive timed cells becomes one trip segment.
//! Rows marked `INBOUND` run the stop columns in reverse.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{ClockTime, DayType, MINUTES_PER_DAY, Mode, Stop, Trip};
use crate::network::StopCatalog;

use super::IngestError;
use super::report::LoadReport;

/// Column layout of one timetable file.
struct Layout {
    trip_id: Option<usize>,
    day_type: Option<usize>,
    direction: Option<usize>,
    route: Option<usize>,
    /// Stop columns in header order, with the stop each resolves to.
    stops: Vec<(usize, Option<Arc<Stop>>)>,
}

impl Layout {
    fn from_headers(path: &Path, headers: &csv::StringRecord, catalog: &StopCatalog) -> Result<Self, IngestError> {
        let mut layout = Layout {
            trip_id: None,
            day_type: None,
            direction: None,
            route: None,
            stops: Vec::new(),
        };

        for (idx, header) in headers.iter().enumerate() {
            match header.trim().to_ascii_lowercase().as_str() {
                "trip_id" | "trip" => layout.trip_id = Some(idx),
                "day_type" | "day" => layout.day_type = Some(idx),
                "direction" => layout.direction = Some(idx),
                "route" => layout.route = Some(idx),
                "" => {}
                _ => {
                    let stop = catalog.resolve(header).cloned();
                    if stop.is_none() {
                        debug!(path = %path.display(), column = header, "timetable column matches no stop");
                    }
                    layout.stops.push((idx, stop));
                }
            }
        }

        if layout.stops.len() < 2 {
            return Err(IngestError::header(path, "timetable needs at least two stop columns"));
        }
        Ok(layout)
    }

    fn missing_stops(&self) -> usize {
        self.stops.iter().filter(|(_, stop)| stop.is_none()).count()
    }
}

/// Key for detecting a trip loaded twice.
type TripKey = (Arc<Stop>, Arc<Stop>, ClockTime, DayType);

/// Accumulates trips across every timetable of one mode.
pub(super) struct TimetableReader<'a> {
    mode: Mode,
    catalog: &'a StopCatalog,
    trips: Vec<Arc<Trip>>,
    seen: HashSet<TripKey>,
    /// Rows read, for the malformed-row ratio.
    rows: usize,
    /// Trips with no trip id are numbered in reading order.
    auto_ids: usize,
}

impl<'a> TimetableReader<'a> {
    pub(super) fn new(mode: Mode, catalog: &'a StopCatalog) -> Self {
        Self {
            mode,
            catalog,
            trips: Vec::new(),
            seen: HashSet::new(),
            rows: 0,
            auto_ids: 0,
        }
    }

    pub(super) fn rows(&self) -> usize {
        self.rows
    }

    pub(super) fn into_trips(self) -> Vec<Arc<Trip>> {
        self.trips
    }

    /// Read one timetable file, appending its trips.
    pub(super) fn read(&mut self, path: &Path, report: &mut LoadReport) -> Result<(), IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| IngestError::csv(path, e))?;

        let headers = reader.headers().map_err(|e| IngestError::csv(path, e))?.clone();
        let layout = Layout::from_headers(path, &headers, self.catalog)?;
        report.missing_stops += layout.missing_stops();

        let before = self.trips.len();
        let mut record = csv::StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "skipping unreadable timetable row");
                    self.rows += 1;
                    report.malformed_rows += 1;
                    continue;
                }
            }
            self.rows += 1;
            if !self.read_row(&layout, &record, report) {
                trace!(
                    path = %path.display(),
                    line = record.position().map_or(0, |p| p.line()),
                    "timetable row has fewer than two timed stops"
                );
                report.malformed_rows += 1;
            }
        }

        debug!(
            path = %path.display(),
            trips = self.trips.len() - before,
            "read timetable"
        );
        Ok(())
    }

    /// Turn one row into trip segments. Returns false if the row is
    /// malformed.
    fn read_row(&mut self, layout: &Layout, record: &csv::StringRecord, report: &mut LoadReport) -> bool {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let day_type = match cell(layout.day_type) {
            "" => DayType::Weekday,
            raw => DayType::normalize(raw).unwrap_or_else(|e| {
                debug!(error = %e, "defaulting to weekday");
                DayType::Weekday
            }),
        };
        let inbound = cell(layout.direction).eq_ignore_ascii_case("inbound");
        let route = cell(layout.route);

        let mut timed: Vec<(&Arc<Stop>, ClockTime)> = layout
            .stops
            .iter()
            .filter_map(|(idx, stop)| {
                let raw = record.get(*idx)?.trim();
                if raw.is_empty() || raw.eq_ignore_ascii_case("via") {
                    return None;
                }
                let stop = stop.as_ref()?;
                match ClockTime::parse_hhmm(raw) {
                    Ok(time) => Some((stop, time)),
                    Err(e) => {
                        trace!(stop = stop.name(), cell = raw, error = %e, "skipping unparseable time");
                        None
                    }
                }
            })
            .collect();
        if inbound {
            timed.reverse();
        }
        if timed.len() < 2 {
            return false;
        }

        let trip_id = match cell(layout.trip_id) {
            "" => {
                self.auto_ids += 1;
                format!("T{}", self.auto_ids)
            }
            id => id.to_string(),
        };
        let base = if route.is_empty() {
            trip_id
        } else {
            format!("{route}-{trip_id}")
        };

        for (segment, pair) in timed.windows(2).enumerate() {
            let (from, dep) = pair[0];
            let (to, arr) = pair[1];
            if from == to {
                continue;
            }

            let key = (from.clone(), to.clone(), dep, day_type);
            if self.seen.contains(&key) {
                report.duplicate_trips += 1;
                continue;
            }

            let trip = Trip::scheduled(from.clone(), to.clone(), dep, segment_duration(dep, arr), day_type, self.mode)
                .map(|t| {
                    let t = t.with_trip_id(format!("{base}-S{}", segment + 1));
                    if route.is_empty() { t } else { t.with_route(route) }
                });
            match trip {
                Ok(trip) => {
                    self.seen.insert(key);
                    self.trips.push(Arc::new(trip));
                }
                Err(e) => trace!(error = %e, "skipping invalid segment"),
            }
        }
        true
    }
}

/// Minutes from `dep` to `arr`, wrapping past midnight, at least one.
fn segment_duration(dep: ClockTime, arr: ClockTime) -> u32 {
    let diff = arr.minutes() as i64 - dep.minutes() as i64;
    let diff = if diff < 0 { diff + MINUTES_PER_DAY as i64 } else { diff };
    diff.max(1) as u32
}
