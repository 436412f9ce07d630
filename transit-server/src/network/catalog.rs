//! Stop lookup shared by single-mode and combined networks.

use std::sync::Arc;

use crate::domain::Stop;

use super::resolve::StopResolver;
use super::spatial::StopLocator;

/// A stop list with name and position lookups.
pub struct StopCatalog {
    stops: Vec<Arc<Stop>>,
    resolver: StopResolver,
    locator: StopLocator,
}

impl StopCatalog {
    pub fn new(stops: Vec<Arc<Stop>>) -> Self {
        Self {
            resolver: StopResolver::new(&stops),
            locator: StopLocator::new(&stops),
            stops,
        }
    }

    pub fn stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Resolve a stop by name, code or fuzzy token match.
    pub fn resolve(&self, label: &str) -> Option<&Arc<Stop>> {
        self.resolver.resolve(label).map(|idx| &self.stops[idx])
    }

    /// Stops ranked against a free-text query.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Arc<Stop>> {
        self.resolver
            .search(query, limit)
            .into_iter()
            .map(|idx| &self.stops[idx])
            .collect()
    }

    pub fn nearest(&self, latitude: f64, longitude: f64) -> Option<&Arc<Stop>> {
        self.locator
            .nearest(latitude, longitude)
            .map(|idx| &self.stops[idx])
    }

    /// Up to `limit` stops nearest a coordinate with distances in km.
    pub fn nearest_n(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<(&Arc<Stop>, f64)> {
        self.locator
            .nearest_n(latitude, longitude, limit)
            .into_iter()
            .map(|(idx, d)| (&self.stops[idx], d))
            .collect()
    }

    /// Stops within `radius_km` of `stop`, closest first, excluding itself.
    pub fn neighbours(&self, stop: &Stop, radius_km: f64) -> Vec<(&Arc<Stop>, f64)> {
        self.locator
            .within(stop.latitude(), stop.longitude(), radius_km)
            .into_iter()
            .map(|(idx, d)| (&self.stops[idx], d))
            .filter(|(other, _)| {
                let other: &Stop = other;
                other != stop
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;

    fn catalog() -> StopCatalog {
        let stop = |name: &str, lat, lon| Arc::new(Stop::new(name, lat, lon, Mode::MyCiti).unwrap());
        StopCatalog::new(vec![
            stop("Civic Centre", -33.9205, 18.4265),
            stop("Adderley", -33.9230, 18.4230),
            stop("Table View", -33.8240, 18.4910),
        ])
    }

    #[test]
    fn resolve_and_search() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("civic ctr").unwrap().name(), "Civic Centre");
        assert!(catalog.resolve("Hout Bay").is_none());
        let found: Vec<&str> = catalog.search("table", 5).iter().map(|s| s.name()).collect();
        assert_eq!(found, vec!["Table View"]);
    }

    #[test]
    fn neighbours_exclude_self() {
        let catalog = catalog();
        let civic = catalog.stops()[0].clone();
        let near = catalog.neighbours(&civic, 0.5);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].0.name(), "Adderley");
    }

    #[test]
    fn nearest_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.nearest(-33.825, 18.49).unwrap().name(), "Table View");
        let two = catalog.nearest_n(-33.9205, 18.4265, 2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].0.name(), "Civic Centre");
        assert!(two[0].1 < 1e-6);
    }
}
