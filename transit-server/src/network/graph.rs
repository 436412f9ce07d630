//! A single mode's network: its stops and the trips between them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{Mode, Stop, Trip};

use super::catalog::StopCatalog;

/// Stops and trips for one travel mode.
///
/// Built once from ingested data and then only read. Every trip endpoint is
/// a member of the stop list; trips that reference other stops are dropped
/// at construction.
pub struct NetworkGraph {
    mode: Mode,
    catalog: StopCatalog,
    trips: Vec<Arc<Trip>>,
    /// Indices into `trips` per origin stop, earliest departure first.
    departures: HashMap<Arc<Stop>, Vec<usize>>,
}

impl NetworkGraph {
    pub fn new(mode: Mode, stops: Vec<Arc<Stop>>, trips: Vec<Arc<Trip>>) -> Self {
        let catalog = StopCatalog::new(stops);
        let known: HashSet<&Arc<Stop>> = catalog.stops().iter().collect();
        let trips: Vec<Arc<Trip>> = trips
            .into_iter()
            .filter(|t| known.contains(t.from()) && known.contains(t.to()))
            .collect();

        let mut departures: HashMap<Arc<Stop>, Vec<usize>> = HashMap::new();
        for (idx, trip) in trips.iter().enumerate() {
            departures.entry(trip.from().clone()).or_default().push(idx);
        }
        for indices in departures.values_mut() {
            // On-demand trips sort after every timed departure.
            indices.sort_by_key(|&i| (trips[i].departure().is_none(), trips[i].departure()));
        }

        Self {
            mode,
            catalog,
            trips,
            departures,
        }
    }

    /// An empty graph, used when a mode has no data.
    pub fn empty(mode: Mode) -> Self {
        Self::new(mode, Vec::new(), Vec::new())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stops(&self) -> &[Arc<Stop>] {
        self.catalog.stops()
    }

    pub fn trips(&self) -> &[Arc<Trip>] {
        &self.trips
    }

    pub fn catalog(&self) -> &StopCatalog {
        &self.catalog
    }

    /// Trips leaving `stop`, earliest departure first.
    pub fn trips_from<'a>(&'a self, stop: &'a Stop) -> impl Iterator<Item = &'a Arc<Trip>> + 'a {
        self.departures
            .get(stop)
            .into_iter()
            .flatten()
            .map(|&idx| &self.trips[idx])
    }

    pub fn nearest_stop(&self, latitude: f64, longitude: f64) -> Option<&Arc<Stop>> {
        self.catalog.nearest(latitude, longitude)
    }

    pub fn nearest_stops(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<(&Arc<Stop>, f64)> {
        self.catalog.nearest_n(latitude, longitude, limit)
    }

    pub fn resolve_stop(&self, label: &str) -> Option<&Arc<Stop>> {
        self.catalog.resolve(label)
    }

    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<&Arc<Stop>> {
        self.catalog.search(query, limit)
    }
}

impl std::fmt::Debug for NetworkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkGraph")
            .field("mode", &self.mode)
            .field("stops", &self.catalog.len())
            .field("trips", &self.trips.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, DayType};

    fn stop(name: &str, lat: f64, lon: f64) -> Arc<Stop> {
        Arc::new(Stop::new(name, lat, lon, Mode::Train).unwrap())
    }

    fn trip(from: &Arc<Stop>, to: &Arc<Stop>, dep: &str) -> Arc<Trip> {
        let dep = ClockTime::parse_hhmm(dep).unwrap();
        Arc::new(Trip::scheduled(from.clone(), to.clone(), dep, 10, DayType::Weekday, Mode::Train).unwrap())
    }

    fn graph() -> (NetworkGraph, Vec<Arc<Stop>>) {
        let a = stop("Cape Town", -33.9221, 18.4255);
        let b = stop("Woodstock", -33.9275, 18.4486);
        let c = stop("Bellville", -33.9046, 18.6297);
        let stray = stop("Simon's Town", -34.19, 18.43);
        let trips = vec![
            trip(&a, &b, "09:00"),
            trip(&a, &b, "07:30"),
            Arc::new(Trip::on_demand(a.clone(), c.clone(), 30, Mode::Train).unwrap()),
            trip(&a, &c, "08:15"),
            trip(&b, &c, "08:00"),
            trip(&b, &stray, "08:00"),
        ];
        let stops = vec![a, b, c];
        (NetworkGraph::new(Mode::Train, stops.clone(), trips), stops)
    }

    #[test]
    fn trips_with_unknown_endpoints_dropped() {
        let (graph, _) = graph();
        assert_eq!(graph.stops().len(), 3);
        assert_eq!(graph.trips().len(), 5);
    }

    #[test]
    fn trips_from_sorted_by_departure() {
        let (graph, stops) = graph();
        let deps: Vec<String> = graph
            .trips_from(&stops[0])
            .map(|t| t.departure().map_or("immediate".to_string(), |d| d.to_string()))
            .collect();
        assert_eq!(deps, vec!["07:30", "08:15", "09:00", "immediate"]);
        assert_eq!(graph.trips_from(&stops[2]).count(), 0);
    }

    #[test]
    fn lookups_delegate_to_catalog() {
        let (graph, _) = graph();
        assert_eq!(graph.resolve_stop("bellville").unwrap().name(), "Bellville");
        assert_eq!(graph.nearest_stop(-33.905, 18.63).unwrap().name(), "Bellville");
        assert_eq!(graph.nearest_stops(-33.92, 18.43, 2).len(), 2);
        assert_eq!(graph.search_stops("wood", 3)[0].name(), "Woodstock");
    }

    #[test]
    fn empty_graph() {
        let graph = NetworkGraph::empty(Mode::Taxi);
        assert_eq!(graph.mode(), Mode::Taxi);
        assert!(graph.stops().is_empty());
        assert!(graph.nearest_stop(0.0, 0.0).is_none());
        assert_eq!(format!("{graph:?}"), "NetworkGraph { mode: Taxi, stops: 0, trips: 0 }");
    }
}
