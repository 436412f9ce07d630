//! Walking transfers between nearby stops.
//!
//! Stops of different modes are often a short walk apart (a train station
//! and the bus stop outside it). The combined network links every stop to
//! its nearest neighbours within walking distance, in both directions.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Mode, Stop, Trip};

use super::catalog::StopCatalog;

/// Parameters for synthesizing walking transfers.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingConfig {
    /// Furthest distance considered walkable (km).
    pub max_distance_km: f64,

    /// Walking speed (km per minute).
    pub speed_km_per_min: f64,

    /// Nearest neighbours linked per stop.
    pub max_neighbours: usize,
}

impl WalkingConfig {
    pub fn new(max_distance_km: f64, speed_km_per_min: f64, max_neighbours: usize) -> Self {
        Self {
            max_distance_km,
            speed_km_per_min,
            max_neighbours,
        }
    }

    /// Walking time for a distance, rounded to the nearest minute and at
    /// least one minute.
    pub fn duration_mins(&self, distance_km: f64) -> u32 {
        let mins = (distance_km / self.speed_km_per_min).round();
        if mins.is_finite() && mins >= 1.0 {
            mins as u32
        } else {
            1
        }
    }
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 0.5,
            speed_km_per_min: 0.0833, // about 5 km/h
            max_neighbours: 10,
        }
    }
}

/// A set of walkable stop pairs with their durations.
///
/// Transfers are symmetric: if you can walk from A to B, you can walk from
/// B to A in the same time.
#[derive(Debug, Clone, Default)]
pub struct WalkingTransfers {
    /// Directed links in insertion order.
    links: Vec<(Arc<Stop>, Arc<Stop>, u32)>,
    lookup: HashMap<(Arc<Stop>, Arc<Stop>), u32>,
}

impl WalkingTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link every stop in `catalog` to its nearest neighbours within
    /// walking distance.
    pub fn synthesize(catalog: &StopCatalog, config: &WalkingConfig) -> Self {
        let mut transfers = Self::new();

        for from in catalog.stops() {
            let nearby = catalog.neighbours(from, config.max_distance_km);
            for (to, distance) in nearby.into_iter().take(config.max_neighbours) {
                transfers.add(from.clone(), to.clone(), config.duration_mins(distance));
            }
        }

        debug!(
            stops = catalog.len(),
            links = transfers.links.len(),
            "synthesized walking transfers"
        );
        transfers
    }

    /// Add a walkable pair in both directions.
    ///
    /// A direction that is already present keeps its existing duration.
    pub fn add(&mut self, from: Arc<Stop>, to: Arc<Stop>, duration_mins: u32) {
        if from == to {
            return;
        }
        self.insert(from.clone(), to.clone(), duration_mins);
        self.insert(to, from, duration_mins);
    }

    fn insert(&mut self, from: Arc<Stop>, to: Arc<Stop>, duration_mins: u32) {
        let key = (from.clone(), to.clone());
        if self.lookup.contains_key(&key) {
            return;
        }
        self.lookup.insert(key, duration_mins);
        self.links.push((from, to, duration_mins));
    }

    /// Walking time between two stops, if walkable.
    #[cfg(test)]
    fn get(&self, from: &Arc<Stop>, to: &Arc<Stop>) -> Option<u32> {
        self.lookup.get(&(from.clone(), to.clone())).copied()
    }

    #[cfg(test)]
    fn is_walkable(&self, from: &Arc<Stop>, to: &Arc<Stop>) -> bool {
        self.get(from, to).is_some()
    }

    /// Number of directed links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// On-demand walking trips, one per directed link.
    pub fn to_trips(&self) -> Vec<Arc<Trip>> {
        self.links
            .iter()
            .filter_map(|(from, to, mins)| {
                Trip::on_demand(from.clone(), to.clone(), *mins, Mode::Walking)
                    .ok()
                    .map(|trip| Arc::new(trip.with_route("Walk")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lat: f64, lon: f64, mode: Mode) -> Arc<Stop> {
        Arc::new(Stop::new(name, lat, lon, mode).unwrap())
    }

    #[test]
    fn default_config() {
        let config = WalkingConfig::default();
        assert_eq!(config.max_distance_km, 0.5);
        assert_eq!(config.speed_km_per_min, 0.0833);
        assert_eq!(config.max_neighbours, 10);
    }

    #[test]
    fn duration_rounds_and_floors_at_one() {
        let config = WalkingConfig::default();
        assert_eq!(config.duration_mins(0.0), 1);
        assert_eq!(config.duration_mins(0.01), 1);
        assert_eq!(config.duration_mins(0.5), 6);
        assert_eq!(config.duration_mins(0.25), 3);
    }

    #[test]
    fn empty_transfers() {
        let walks = WalkingTransfers::new();
        assert!(walks.is_empty());
        assert_eq!(walks.len(), 0);
        assert!(walks.to_trips().is_empty());
    }

    #[test]
    fn add_is_symmetric_and_deduplicated() {
        let a = stop("A", -33.92, 18.42, Mode::Train);
        let b = stop("B", -33.92, 18.421, Mode::MyCiti);
        let mut walks = WalkingTransfers::new();

        walks.add(a.clone(), b.clone(), 4);
        walks.add(b.clone(), a.clone(), 9);
        walks.add(a.clone(), a.clone(), 1);

        assert_eq!(walks.len(), 2);
        assert_eq!(walks.get(&a, &b), Some(4));
        assert_eq!(walks.get(&b, &a), Some(4));
        assert!(walks.is_walkable(&a, &b));
        assert!(!walks.is_walkable(&a, &a));
    }

    #[test]
    fn synthesize_links_nearby_stops_only() {
        let station = stop("Cape Town", -33.9221, 18.4255, Mode::Train);
        let bus = stop("Adderley", -33.9230, 18.4230, Mode::MyCiti);
        let far = stop("Bellville", -33.9046, 18.6297, Mode::Train);
        let catalog = StopCatalog::new(vec![station.clone(), bus.clone(), far.clone()]);

        let walks = WalkingTransfers::synthesize(&catalog, &WalkingConfig::default());
        assert_eq!(walks.len(), 2);
        let mins = walks.get(&station, &bus).unwrap();
        assert!((1..=6).contains(&mins));
        assert!(!walks.is_walkable(&station, &far));

        let trips = walks.to_trips();
        assert_eq!(trips.len(), 2);
        assert!(trips.iter().all(|t| t.is_on_demand()));
        assert!(trips.iter().all(|t| crate::domain::RouteLabel::mode(t.as_ref()) == Mode::Walking));
    }

    #[test]
    fn synthesize_caps_neighbours() {
        let hub = stop("Hub", -33.92, 18.42, Mode::Train);
        let mut stops = vec![hub.clone()];
        for i in 0..5 {
            stops.push(stop(&format!("S{i}"), -33.92 + 0.0005 * (i as f64 + 1.0), 18.42, Mode::MyCiti));
        }
        let catalog = StopCatalog::new(stops);
        let config = WalkingConfig::new(0.5, 0.0833, 2);

        let walks = WalkingTransfers::synthesize(&catalog, &config);
        // The hub links to its two nearest stops itself; others may link back to it.
        assert!(walks.is_walkable(&hub, &catalog.stops()[1]));
        assert!(walks.is_walkable(&hub, &catalog.stops()[2]));
    }
}
