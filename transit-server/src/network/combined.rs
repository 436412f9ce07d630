//! The combined multimodal network.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::info;

use crate::domain::{Mode, RouteLabel, Stop, Trip};

use super::catalog::StopCatalog;
use super::graph::NetworkGraph;
use super::walking::{WalkingConfig, WalkingTransfers};

/// The union of several mode networks, linked by walking transfers.
pub struct CombinedGraph {
    catalog: StopCatalog,
    trips: Vec<Arc<Trip>>,
    walking_links: usize,
}

/// Stops and trips of a mode-filtered view of a [`CombinedGraph`].
#[derive(Debug, Clone)]
pub struct Selection {
    pub modes: BTreeSet<Mode>,
    pub stops: Vec<Arc<Stop>>,
    pub trips: Vec<Arc<Trip>>,
}

impl CombinedGraph {
    /// Union the stops and trips of `graphs`, adding walking transfers
    /// between nearby stops when `walking` is given.
    pub fn build<'a>(
        graphs: impl IntoIterator<Item = &'a NetworkGraph>,
        walking: Option<&WalkingConfig>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut stops = Vec::new();
        let mut trips = Vec::new();

        for graph in graphs {
            for stop in graph.stops() {
                if seen.insert(stop.clone()) {
                    stops.push(stop.clone());
                }
            }
            trips.extend(graph.trips().iter().cloned());
        }

        let catalog = StopCatalog::new(stops);
        let walking_links = match walking {
            Some(config) => {
                let transfers = WalkingTransfers::synthesize(&catalog, config);
                trips.extend(transfers.to_trips());
                transfers.len()
            }
            None => 0,
        };

        info!(
            stops = catalog.len(),
            trips = trips.len(),
            walking_links,
            "built combined network"
        );

        Self {
            catalog,
            trips,
            walking_links,
        }
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

    /// Number of directed walking links added.
    pub fn walking_links(&self) -> usize {
        self.walking_links
    }

    /// Stops and trips for the modes in `requested`.
    ///
    /// See [`effective_modes`] for how the request is widened. Walking
    /// trips are kept only between selected stops.
    pub fn select(&self, requested: &[Mode]) -> Selection {
        let modes = effective_modes(requested);

        let stops: Vec<Arc<Stop>> = self
            .stops()
            .iter()
            .filter(|s| modes.contains(&s.mode()))
            .cloned()
            .collect();
        let kept: HashSet<&Arc<Stop>> = stops.iter().collect();

        let trips = self
            .trips
            .iter()
            .filter(|t| modes.contains(&t.mode()))
            .filter(|t| kept.contains(t.from()) && kept.contains(t.to()))
            .cloned()
            .collect();

        Selection {
            modes,
            stops,
            trips,
        }
    }
}

/// The modes a request actually routes over.
///
/// An empty request means every mode. A request for more than one mode
/// always includes walking so that changes between modes are possible.
pub fn effective_modes(requested: &[Mode]) -> BTreeSet<Mode> {
    let mut modes: BTreeSet<Mode> = requested.iter().copied().collect();
    if modes.is_empty() {
        modes.extend(Mode::LOADED);
        modes.insert(Mode::Walking);
    } else if modes.len() > 1 {
        modes.insert(Mode::Walking);
    }
    modes
}

impl std::fmt::Debug for CombinedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedGraph")
            .field("stops", &self.catalog.len())
            .field("trips", &self.trips.len())
            .field("walking_links", &self.walking_links)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, DayType};

    fn stop(name: &str, lat: f64, lon: f64, mode: Mode) -> Arc<Stop> {
        Arc::new(Stop::new(name, lat, lon, mode).unwrap())
    }

    fn trip(from: &Arc<Stop>, to: &Arc<Stop>, mode: Mode) -> Arc<Trip> {
        let dep = ClockTime::from_hm(8, 0).unwrap();
        Arc::new(Trip::scheduled(from.clone(), to.clone(), dep, 10, DayType::Weekday, mode).unwrap())
    }

    fn networks() -> Vec<NetworkGraph> {
        let station = stop("Cape Town", -33.9221, 18.4255, Mode::Train);
        let bellville = stop("Bellville", -33.9046, 18.6297, Mode::Train);
        let civic = stop("Civic Centre", -33.9205, 18.4265, Mode::MyCiti);
        let table_view = stop("Table View", -33.8240, 18.4910, Mode::MyCiti);
        let ga_city = stop("Cape Town Station Deck", -33.9225, 18.4250, Mode::GoldenArrow);
        let ga_bel = stop("Bellville Terminus", -33.9050, 18.6290, Mode::GoldenArrow);

        vec![
            NetworkGraph::new(
                Mode::Train,
                vec![station.clone(), bellville.clone()],
                vec![trip(&station, &bellville, Mode::Train)],
            ),
            NetworkGraph::new(
                Mode::MyCiti,
                vec![civic.clone(), table_view.clone()],
                vec![trip(&civic, &table_view, Mode::MyCiti)],
            ),
            NetworkGraph::new(
                Mode::GoldenArrow,
                vec![ga_city.clone(), ga_bel.clone()],
                vec![trip(&ga_city, &ga_bel, Mode::GoldenArrow)],
            ),
        ]
    }

    #[test]
    fn effective_modes_widening() {
        let all: BTreeSet<Mode> = [
            Mode::Train,
            Mode::MyCiti,
            Mode::GoldenArrow,
            Mode::Taxi,
            Mode::Walking,
        ]
        .into_iter()
        .collect();
        assert_eq!(effective_modes(&[]), all);
        assert_eq!(effective_modes(&[Mode::Train]), BTreeSet::from([Mode::Train]));
        assert_eq!(
            effective_modes(&[Mode::Train, Mode::MyCiti]),
            BTreeSet::from([Mode::Train, Mode::MyCiti, Mode::Walking])
        );
        assert_eq!(
            effective_modes(&[Mode::Train, Mode::Train]),
            BTreeSet::from([Mode::Train])
        );
    }

    #[test]
    fn union_without_walking() {
        let graphs = networks();
        let combined = CombinedGraph::build(&graphs, None);
        assert_eq!(combined.stops().len(), 6);
        assert_eq!(combined.trips().len(), 3);
        assert_eq!(combined.walking_links(), 0);
    }

    #[test]
    fn duplicate_stops_collapse() {
        let graphs = networks();
        let combined = CombinedGraph::build([&graphs[0], &graphs[0]], None);
        assert_eq!(combined.stops().len(), 2);
    }

    #[test]
    fn walking_links_nearby_stops_of_all_modes() {
        let graphs = networks();
        let combined = CombinedGraph::build(&graphs, Some(&WalkingConfig::default()));
        assert!(combined.walking_links() > 0);
        assert_eq!(combined.trips().len(), 3 + combined.walking_links());

        let walks: Vec<&Arc<Trip>> = combined
            .trips()
            .iter()
            .filter(|t| t.mode() == Mode::Walking)
            .collect();
        assert!(walks.iter().all(|t| t.is_on_demand()));
        assert!(
            walks
                .iter()
                .any(|t| t.from().name() == "Cape Town" && t.to().name() == "Civic Centre")
        );
        assert!(
            walks
                .iter()
                .all(|t| t.from().name() != "Table View" && t.to().name() != "Table View")
        );
    }

    #[test]
    fn select_filters_by_mode() {
        let graphs = networks();
        let combined = CombinedGraph::build(&graphs, Some(&WalkingConfig::default()));

        let train = combined.select(&[Mode::Train]);
        assert_eq!(train.stops.len(), 2);
        assert_eq!(train.trips.len(), 1);

        let train_bus = combined.select(&[Mode::Train, Mode::MyCiti]);
        assert!(train_bus.modes.contains(&Mode::Walking));
        assert_eq!(train_bus.stops.len(), 4);
        assert!(train_bus.trips.iter().any(|t| t.mode() == Mode::Walking));
        assert!(
            train_bus
                .trips
                .iter()
                .all(|t| t.from().mode() != Mode::GoldenArrow && t.to().mode() != Mode::GoldenArrow)
        );

        let everything = combined.select(&[]);
        assert_eq!(everything.stops.len(), 6);
        assert_eq!(everything.trips.len(), combined.trips().len());
    }
}
