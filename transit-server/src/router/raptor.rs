//! Round-based earliest-arrival search.

use tracing::trace;

use crate::domain::{ClockTime, DayType};

use super::connections::{
    BuildStats, Connection, ConnectionModel, Predecessor, UNREACHED, group_offsets, reconstruct,
};
use super::{RouteResult, TimetableEntry};

/// Arrival labels after a search.
pub(super) struct Labels {
    pub best: Vec<u32>,
    pub preds: Vec<Predecessor>,
    pub rounds: usize,
}

/// Label-correcting router that works in rounds.
///
/// Each round scans the outgoing connections of the stops improved in the
/// previous round. `max_rounds` bounds the search depth, not the leg count:
/// a marked stop scanned later in a round sees any improvement made earlier
/// in that round, so one round can chain several legs.
pub struct RoundBasedRouter<T: TimetableEntry> {
    model: ConnectionModel<T>,
    /// Connections sorted by origin stop, then departure.
    outgoing: Vec<Connection>,
    offsets: Vec<usize>,
}

impl<T: TimetableEntry> RoundBasedRouter<T> {
    /// Build a router over `stops`. Trips with an endpoint outside `stops`
    /// are skipped and counted in [`BuildStats::orphans`].
    pub fn new(stops: &[T::Stop], trips: impl IntoIterator<Item = T>) -> Self {
        let model = ConnectionModel::build(stops, trips);

        let mut outgoing = model.connections.clone();
        // Stable, so equal departures keep trip order.
        outgoing.sort_by_key(|c| (c.from, c.dep));
        let offsets = group_offsets(model.stop_count(), &outgoing, |c| c.from);

        Self {
            model,
            outgoing,
            offsets,
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.model.stats
    }

    fn outgoing_from(&self, stop: usize) -> &[Connection] {
        &self.outgoing[self.offsets[stop]..self.offsets[stop + 1]]
    }

    /// Find the earliest arrival at `target` leaving `source` at
    /// `departure`, using at most `max_rounds` rounds.
    ///
    /// A round limit of zero is treated as one. Returns `None` if either
    /// stop is unknown or the target cannot be reached.
    pub fn route(
        &self,
        source: &T::Stop,
        target: &T::Stop,
        departure: ClockTime,
        max_rounds: usize,
        day_type: DayType,
    ) -> Option<RouteResult<T>>
    where
        T: Clone,
    {
        let source = self.model.index.get(source)?;
        let target = self.model.index.get(target)?;
        let departure = departure.minutes();

        let labels = self.search(source, departure, max_rounds, day_type, |_, _| {});
        let arrival = labels.best[target];
        if arrival == UNREACHED {
            trace!(rounds = labels.rounds, "target not reached");
            return None;
        }

        let legs = reconstruct(&labels.preds, source, target)?
            .into_iter()
            .map(|trip| self.model.trips[trip].clone())
            .collect();

        Some(RouteResult::new(legs, departure, arrival))
    }

    /// Run the rounds from `source`, calling `on_round` with the labels
    /// after each round that improved something.
    pub(super) fn search(
        &self,
        source: usize,
        departure: u32,
        max_rounds: usize,
        day_type: DayType,
        mut on_round: impl FnMut(usize, &[u32]),
    ) -> Labels {
        let n = self.model.stop_count();
        let mut best = vec![UNREACHED; n];
        let mut preds: Vec<Predecessor> = vec![None; n];
        let mut queued = vec![false; n];
        best[source] = departure;

        let mut marked = vec![source];
        let mut rounds = 0;

        for round in 0..max_rounds.max(1) {
            rounds = round + 1;
            let mut next = Vec::new();

            for &stop in &marked {
                let at = best[stop];
                let connections = self.outgoing_from(stop);
                let first = connections.partition_point(|c| c.dep < at);

                for c in &connections[first..] {
                    if c.day_type != day_type || c.dep < best[stop] {
                        continue;
                    }
                    if c.arr < best[c.to] {
                        best[c.to] = c.arr;
                        preds[c.to] = Some((stop, c.trip));
                        if !queued[c.to] {
                            queued[c.to] = true;
                            next.push(c.to);
                        }
                    }
                }

                for f in self.model.footpaths_from(stop) {
                    let arr = best[stop].saturating_add(f.duration);
                    if arr < best[f.to] {
                        best[f.to] = arr;
                        preds[f.to] = Some((stop, f.trip));
                        if !queued[f.to] {
                            queued[f.to] = true;
                            next.push(f.to);
                        }
                    }
                }
            }

            if next.is_empty() {
                trace!(round, "no stop improved");
                break;
            }

            on_round(round, &best);

            for &stop in &next {
                queued[stop] = false;
            }
            next.sort_unstable();
            marked = next;
        }

        Labels {
            best,
            preds,
            rounds,
        }
    }
}
