//! Time-expanded connection model shared by both routers.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::{ClockTime, DayType, MINUTES_PER_DAY};

use super::TimetableEntry;

/// Arrival label for a stop that has not been reached.
pub(crate) const UNREACHED: u32 = u32::MAX;

/// The stop and trip a stop was last improved from.
pub(crate) type Predecessor = Option<(usize, usize)>;

/// Dense ids for the stops a router was built over.
#[derive(Debug, Clone)]
pub(crate) struct StopIndex<S> {
    ids: HashMap<S, usize>,
}

impl<S: Eq + Hash + Clone> StopIndex<S> {
    /// Index the stops in order. A repeated stop keeps its first id.
    fn new(stops: &[S]) -> Self {
        let mut ids = HashMap::with_capacity(stops.len());
        for stop in stops {
            let next = ids.len();
            ids.entry(stop.clone()).or_insert(next);
        }
        Self { ids }
    }

    pub(crate) fn get(&self, stop: &S) -> Option<usize> {
        self.ids.get(stop).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

/// A scheduled trip projected into absolute minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Connection {
    pub from: usize,
    pub to: usize,
    pub dep: u32,
    pub arr: u32,
    pub day_type: DayType,
    pub trip: usize,
}

/// An untimed trip, usable as soon as its origin is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Footpath {
    pub from: usize,
    pub to: usize,
    pub duration: u32,
    pub trip: usize,
}

/// Counts gathered while building a router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Distinct stops in the id space.
    pub stops: usize,
    /// Trips accepted into the model.
    pub trips: usize,
    /// Timed connections, including next-day copies.
    pub connections: usize,
    /// Untimed footpaths.
    pub footpaths: usize,
    /// Trips dropped because an endpoint was not in the stop list.
    pub orphans: usize,
}

/// Project a departure and duration into absolute minutes.
///
/// An arrival that does not fall strictly after the departure is taken to
/// cross midnight.
pub(crate) fn expand(departure: ClockTime, duration_mins: u32) -> (u32, u32) {
    let dep = departure.minutes();
    let mut arr = dep + duration_mins;
    if arr <= dep {
        arr += MINUTES_PER_DAY;
    }
    (dep, arr)
}

/// The indexed timetable a router searches.
///
/// Connections are left in trip order; each router sorts them the way its
/// search needs. Footpaths are grouped by origin stop.
pub(crate) struct ConnectionModel<T: TimetableEntry> {
    pub index: StopIndex<T::Stop>,
    pub trips: Vec<T>,
    pub connections: Vec<Connection>,
    footpaths: Vec<Footpath>,
    footpath_offsets: Vec<usize>,
    pub stats: BuildStats,
}

impl<T: TimetableEntry> ConnectionModel<T> {
    /// Build the model. Never fails: trips whose endpoints are missing from
    /// `stops` are counted and skipped.
    pub(crate) fn build(stops: &[T::Stop], trips: impl IntoIterator<Item = T>) -> Self {
        let index = StopIndex::new(stops);
        let mut accepted = Vec::new();
        let mut connections = Vec::new();
        let mut footpaths = Vec::new();
        let mut orphans = 0;

        for trip in trips {
            let (Some(from), Some(to)) = (
                index.get(trip.departure_stop()),
                index.get(trip.destination_stop()),
            ) else {
                orphans += 1;
                continue;
            };

            let trip_idx = accepted.len();
            match trip.departure_time() {
                Some(departure) => {
                    let (dep, arr) = expand(departure, trip.duration_mins());
                    let day_type = trip.day_type();
                    for offset in [0, MINUTES_PER_DAY] {
                        connections.push(Connection {
                            from,
                            to,
                            dep: dep + offset,
                            arr: arr + offset,
                            day_type,
                            trip: trip_idx,
                        });
                    }
                }
                None => footpaths.push(Footpath {
                    from,
                    to,
                    duration: trip.duration_mins(),
                    trip: trip_idx,
                }),
            }
            accepted.push(trip);
        }

        if orphans > 0 {
            debug!(orphans, "dropped trips with endpoints outside the stop list");
        }

        footpaths.sort_by_key(|f| f.from);
        let footpath_offsets = group_offsets(index.len(), &footpaths, |f| f.from);

        let stats = BuildStats {
            stops: index.len(),
            trips: accepted.len(),
            connections: connections.len(),
            footpaths: footpaths.len(),
            orphans,
        };
        trace!(?stats, "built connection model");

        Self {
            index,
            trips: accepted,
            connections,
            footpaths,
            footpath_offsets,
            stats,
        }
    }

    /// Footpaths leaving a stop.
    pub(crate) fn footpaths_from(&self, stop: usize) -> &[Footpath] {
        &self.footpaths[self.footpath_offsets[stop]..self.footpath_offsets[stop + 1]]
    }

    pub(crate) fn stop_count(&self) -> usize {
        self.index.len()
    }
}

/// Offsets for items sorted by a stop id, so that the items for stop `s`
/// are `items[offsets[s]..offsets[s + 1]]`.
pub(crate) fn group_offsets<I>(stops: usize, items: &[I], key: impl Fn(&I) -> usize) -> Vec<usize> {
    let mut offsets = vec![0; stops + 1];
    for item in items {
        offsets[key(item) + 1] += 1;
    }
    for s in 0..stops {
        offsets[s + 1] += offsets[s];
    }
    offsets
}

/// Walk predecessor links back from `target`, returning trip indices in
/// travel order.
///
/// Returns `None` if the chain does not lead back to `source`.
pub(crate) fn reconstruct(preds: &[Predecessor], source: usize, target: usize) -> Option<Vec<usize>> {
    let mut legs = Vec::new();
    let mut visited = vec![false; preds.len()];
    let mut current = target;

    while current != source {
        if visited[current] {
            trace!(stop = current, "predecessor cycle");
            return None;
        }
        visited[current] = true;

        let (prev, trip) = preds[current]?;
        legs.push(trip);
        current = prev;
    }

    legs.reverse();
    Some(legs)
}
