//! Spatial index over stop coordinates.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::domain::{Stop, haversine_km};

/// Kilometres per degree of latitude.
const KM_PER_DEGREE: f64 = 111.32;

type Point = GeomWithData<[f64; 2], usize>;

/// R-tree of stop positions, keyed by index into a stop slice.
///
/// Coordinates are projected onto a local plane in kilometres around the
/// mean latitude, which is accurate enough for a metropolitan network.
/// Distances returned to callers are great-circle distances.
pub struct StopLocator {
    tree: RTree<Point>,
    coords: Vec<(f64, f64)>,
    lon_scale: f64,
}

impl StopLocator {
    pub fn new(stops: &[impl AsRef<Stop>]) -> Self {
        let coords: Vec<(f64, f64)> = stops
            .iter()
            .map(|s| (s.as_ref().latitude(), s.as_ref().longitude()))
            .collect();

        let mean_lat = if coords.is_empty() {
            0.0
        } else {
            coords.iter().map(|(lat, _)| lat).sum::<f64>() / coords.len() as f64
        };
        let lon_scale = KM_PER_DEGREE * mean_lat.to_radians().cos();

        let points = coords
            .iter()
            .enumerate()
            .map(|(idx, &(lat, lon))| Point::new(project(lat, lon, lon_scale), idx))
            .collect();

        Self {
            tree: RTree::bulk_load(points),
            coords,
            lon_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Index of the stop nearest to a coordinate.
    pub fn nearest(&self, latitude: f64, longitude: f64) -> Option<usize> {
        self.tree
            .nearest_neighbor(&project(latitude, longitude, self.lon_scale))
            .map(|p| p.data)
    }

    /// Up to `limit` stops nearest to a coordinate, closest first, with
    /// their distance in kilometres.
    pub fn nearest_n(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter(&project(latitude, longitude, self.lon_scale))
            .take(limit)
            .map(|p| (p.data, self.distance_from(latitude, longitude, p.data)))
            .collect()
    }

    /// Stops within `radius_km` of a coordinate, closest first.
    pub fn within(&self, latitude: f64, longitude: f64, radius_km: f64) -> Vec<(usize, f64)> {
        // Search a slightly larger planar radius, then filter on the
        // great-circle distance.
        let planar = radius_km * 1.05;
        let mut found: Vec<(usize, f64)> = self
            .tree
            .locate_within_distance(project(latitude, longitude, self.lon_scale), planar * planar)
            .map(|p| (p.data, self.distance_from(latitude, longitude, p.data)))
            .filter(|(_, d)| *d <= radius_km)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }

    fn distance_from(&self, latitude: f64, longitude: f64, idx: usize) -> f64 {
        let (lat, lon) = self.coords[idx];
        haversine_km(latitude, longitude, lat, lon)
    }
}

fn project(latitude: f64, longitude: f64, lon_scale: f64) -> [f64; 2] {
    [longitude * lon_scale, latitude * KM_PER_DEGREE]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;

    fn stop(name: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(name, lat, lon, Mode::MyCiti).unwrap()
    }

    fn stops() -> Vec<Stop> {
        vec![
            stop("Civic Centre", -33.9205, 18.4265),
            stop("Adderley", -33.9230, 18.4230),
            stop("Table View", -33.8240, 18.4910),
            stop("Airport", -33.9700, 18.5970),
        ]
    }

    #[test]
    fn empty_locator() {
        let locator = StopLocator::new(&Vec::<Stop>::new());
        assert!(locator.is_empty());
        assert_eq!(locator.nearest(-33.9, 18.4), None);
        assert!(locator.within(-33.9, 18.4, 1.0).is_empty());
    }

    #[test]
    fn nearest_stop() {
        let locator = StopLocator::new(&stops());
        assert_eq!(locator.len(), 4);
        assert_eq!(locator.nearest(-33.8250, 18.4900), Some(2));
        assert_eq!(locator.nearest(-33.9231, 18.4229), Some(1));
    }

    #[test]
    fn nearest_n_ordered_by_distance() {
        let locator = StopLocator::new(&stops());
        let found = locator.nearest_n(-33.9210, 18.4260, 3);
        let ids: Vec<usize> = found.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(found[0].1 < found[1].1);
    }

    #[test]
    fn within_radius_uses_great_circle_distance() {
        let locator = StopLocator::new(&stops());
        let near = locator.within(-33.9205, 18.4265, 0.5);
        let ids: Vec<usize> = near.iter().map(|(i, _)| *i).collect();
        // Civic Centre itself and Adderley, about 0.5 km apart, but not Table View.
        assert_eq!(ids[0], 0);
        assert!(!ids.contains(&2));
        assert!(near.iter().all(|(_, d)| *d <= 0.5));
    }
}
