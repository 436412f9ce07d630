//! Connection scan: a single pass over connections in departure order.

use tracing::trace;

use crate::domain::{ClockTime, DayType};

use super::connections::{BuildStats, ConnectionModel, Predecessor, UNREACHED, reconstruct};
use super::{RouteResult, TimetableEntry};

/// Earliest-arrival router scanning one globally sorted connection array.
///
/// The scan stops as soon as the next connection departs after the best
/// known arrival at the target, since no later departure can arrive earlier.
pub struct ConnectionScanRouter<T: TimetableEntry> {
    model: ConnectionModel<T>,
}

/// Mutable labels for one scan.
struct ScanState {
    best: Vec<u32>,
    preds: Vec<Predecessor>,
    target: usize,
    best_target: u32,
    worklist: Vec<usize>,
}

impl ScanState {
    fn improve(&mut self, stop: usize, arrival: u32, pred: (usize, usize)) -> bool {
        if arrival >= self.best[stop] {
            return false;
        }
        self.best[stop] = arrival;
        self.preds[stop] = Some(pred);
        if stop == self.target && arrival < self.best_target {
            self.best_target = arrival;
        }
        true
    }
}

impl<T: TimetableEntry> ConnectionScanRouter<T> {
    /// Build a router over `stops`. Trips with an endpoint outside `stops`
    /// are skipped and counted in [`BuildStats::orphans`].
    pub fn new(stops: &[T::Stop], trips: impl IntoIterator<Item = T>) -> Self {
        let mut model = ConnectionModel::build(stops, trips);
        model.connections.sort_by_key(|c| c.dep);
        Self { model }
    }

    pub fn stats(&self) -> BuildStats {
        self.model.stats
    }

    /// Find the earliest arrival at `target` leaving `source` at
    /// `departure` on `day_type`.
    ///
    /// Returns `None` if either stop is unknown or the target cannot be
    /// reached.
    pub fn scan(
        &self,
        source: &T::Stop,
        target: &T::Stop,
        departure: ClockTime,
        day_type: DayType,
    ) -> Option<RouteResult<T>>
    where
        T: Clone,
    {
        let source = self.model.index.get(source)?;
        let target = self.model.index.get(target)?;
        let departure = departure.minutes();

        let n = self.model.stop_count();
        let mut state = ScanState {
            best: vec![UNREACHED; n],
            preds: vec![None; n],
            target,
            best_target: UNREACHED,
            worklist: Vec::new(),
        };
        state.best[source] = departure;
        if source == target {
            state.best_target = departure;
        }
        self.relax_footpaths(source, &mut state);

        let connections = &self.model.connections;
        let start = connections.partition_point(|c| c.dep < departure);
        let mut scanned = 0usize;

        for c in &connections[start..] {
            if c.dep > state.best_target {
                break;
            }
            scanned += 1;
            if c.day_type != day_type || c.dep < state.best[c.from] {
                continue;
            }
            if state.improve(c.to, c.arr, (c.from, c.trip)) {
                self.relax_footpaths(c.to, &mut state);
            }
        }
        trace!(scanned, "connection scan finished");

        let arrival = state.best[target];
        if arrival == UNREACHED {
            return None;
        }

        let legs = reconstruct(&state.preds, source, target)?
            .into_iter()
            .map(|trip| self.model.trips[trip].clone())
            .collect();

        Some(RouteResult::new(legs, departure, arrival))
    }

    /// Follow footpaths from a freshly improved stop, transitively.
    fn relax_footpaths(&self, origin: usize, state: &mut ScanState) {
        state.worklist.push(origin);
        while let Some(stop) = state.worklist.pop() {
            let at = state.best[stop];
            for f in self.model.footpaths_from(stop) {
                if state.improve(f.to, at.saturating_add(f.duration), (stop, f.trip)) {
                    state.worklist.push(f.to);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mode, Stop, Trip};
    use std::sync::Arc;

    fn stop(name: &str) -> Arc<Stop> {
        Arc::new(Stop::new(name, -33.9, 18.4, Mode::GoldenArrow).unwrap())
    }

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn trip(from: &Arc<Stop>, to: &Arc<Stop>, dep: &str, dur: u32) -> Arc<Trip> {
        Arc::new(
            Trip::scheduled(from.clone(), to.clone(), t(dep), dur, DayType::Weekday, Mode::GoldenArrow)
                .unwrap(),
        )
    }

    #[test]
    fn connections_sorted_globally() {
        let (a, b, c) = (stop("A"), stop("B"), stop("C"));
        let router = ConnectionScanRouter::new(
            &[a.clone(), b.clone(), c.clone()],
            vec![trip(&b, &c, "09:00", 5), trip(&a, &b, "08:00", 5)],
        );
        let deps: Vec<u32> = router.model.connections.iter().map(|c| c.dep).collect();
        assert_eq!(deps, vec![480, 540, 1920, 1980]);
    }

    #[test]
    fn late_query_catches_next_morning() {
        let (a, b) = (stop("A"), stop("B"));
        let router = ConnectionScanRouter::new(&[a.clone(), b.clone()], vec![trip(&a, &b, "06:00", 30)]);

        let result = router.scan(&a, &b, t("22:00"), DayType::Weekday).unwrap();
        assert_eq!(result.arrival_minutes(), 1440 + 390);
        assert_eq!(result.arrival(), t("06:30"));
        assert_eq!(result.elapsed_mins(), 8 * 60 + 30);
    }

    #[test]
    fn chained_footpaths_relaxed_transitively() {
        let (a, b, c, d) = (stop("A"), stop("B"), stop("C"), stop("D"));
        let walk = |from: &Arc<Stop>, to: &Arc<Stop>, dur| {
            Arc::new(Trip::on_demand(from.clone(), to.clone(), dur, Mode::Walking).unwrap())
        };
        let router = ConnectionScanRouter::new(
            &[a.clone(), b.clone(), c.clone(), d.clone()],
            vec![trip(&a, &b, "08:00", 10), walk(&b, &c, 3), walk(&c, &d, 4)],
        );

        let result = router.scan(&a, &d, t("07:55"), DayType::Weekday).unwrap();
        assert_eq!(result.arrival(), t("08:17"));
        assert_eq!(result.legs().len(), 3);
    }

    #[test]
    fn walk_from_source_before_scan() {
        let (a, b, c) = (stop("A"), stop("B"), stop("C"));
        let router = ConnectionScanRouter::new(
            &[a.clone(), b.clone(), c.clone()],
            vec![
                Arc::new(Trip::on_demand(a.clone(), b.clone(), 5, Mode::Walking).unwrap()),
                trip(&b, &c, "08:10", 10),
            ],
        );

        let result = router.scan(&a, &c, t("08:00"), DayType::Weekday).unwrap();
        assert_eq!(result.arrival(), t("08:20"));
        assert!(router.scan(&a, &c, t("08:06"), DayType::Weekday).unwrap().arrival_minutes() > 1440);
    }
}
