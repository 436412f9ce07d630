//! Stops: named points in a transit network.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::{DomainError, Mode};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A boarding point in one mode's network.
///
/// Identity is the case-insensitive name plus the optional stop code, scoped
/// to the mode so that a train station and a bus stop sharing a name stay
/// distinct in the combined network.
///
/// # Examples
///
/// ```
/// use transit_server::domain::{Mode, Stop};
///
/// let a = Stop::new("Cape Town", -33.9221, 18.4255, Mode::Train).unwrap();
/// let b = Stop::new("CAPE TOWN", -33.9, 18.4, Mode::Train).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Clone)]
pub struct Stop {
    name: String,
    code: Option<String>,
    latitude: f64,
    longitude: f64,
    address: Option<String>,
    mode: Mode,
    route_codes: Vec<String>,
    name_key: String,
    code_key: Option<String>,
}

impl Stop {
    /// Create a stop, validating the name and coordinates.
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        mode: Mode,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidStop("name must not be empty"));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            name_key: normalize_key(&name),
            name,
            code: None,
            latitude,
            longitude,
            address: None,
            mode,
            route_codes: Vec::new(),
            code_key: None,
        })
    }

    /// Attach a stable stop code. Blank codes are ignored.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into().trim().to_string();
        if !code.is_empty() {
            self.code_key = Some(normalize_key(&code));
            self.code = Some(code);
        }
        self
    }

    /// Attach a free-text address. Blank addresses are ignored.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into().trim().to_string();
        if !address.is_empty() {
            self.address = Some(address);
        }
        self
    }

    /// Attach the route tokens serving this stop.
    pub fn with_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_codes = routes
            .into_iter()
            .map(Into::into)
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn route_codes(&self) -> &[String] {
        &self.route_codes
    }

    /// Upper-cased, whitespace-collapsed name used for exact lookups.
    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    /// Upper-cased code used for exact lookups.
    pub fn code_key(&self) -> Option<&str> {
        self.code_key.as_deref()
    }

    /// Great-circle distance to another stop in kilometres.
    pub fn distance_km_to(&self, other: &Stop) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Normalize a name or code for case-insensitive comparison.
pub(crate) fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

impl PartialEq for Stop {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.name_key == other.name_key && self.code_key == other.code_key
    }
}

impl Eq for Stop {}

impl Hash for Stop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.name_key.hash(state);
        self.code_key.hash(state);
    }
}

impl AsRef<Stop> for Stop {
    fn as_ref(&self) -> &Stop {
        self
    }
}

impl fmt::Debug for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "Stop({} [{}], {})", self.name, code, self.mode),
            None => write!(f, "Stop({}, {})", self.name, self.mode),
        }
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn stop(name: &str) -> Stop {
        Stop::new(name, -33.92, 18.42, Mode::MyCiti).unwrap()
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Stop::new("", 0.0, 0.0, Mode::Train).is_err());
        assert!(Stop::new("   ", 0.0, 0.0, Mode::Train).is_err());
    }

    #[test]
    fn rejects_invalid_coordinates() {
        assert!(Stop::new("A", 91.0, 0.0, Mode::Train).is_err());
        assert!(Stop::new("A", -90.5, 0.0, Mode::Train).is_err());
        assert!(Stop::new("A", 0.0, 180.5, Mode::Train).is_err());
        assert!(Stop::new("A", f64::NAN, 0.0, Mode::Train).is_err());
        assert!(Stop::new("A", 90.0, -180.0, Mode::Train).is_ok());
    }

    #[test]
    fn name_trimmed() {
        assert_eq!(stop("  Civic Centre ").name(), "Civic Centre");
    }

    #[test]
    fn equality_ignores_case_and_spacing() {
        assert_eq!(stop("Civic Centre"), stop("CIVIC  centre"));
        assert_ne!(stop("Civic Centre"), stop("Adderley"));
    }

    #[test]
    fn code_participates_in_identity() {
        let a = stop("Adderley").with_code("ad1");
        let b = stop("Adderley").with_code("AD1");
        let c = stop("Adderley").with_code("AD2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, stop("Adderley"));
    }

    #[test]
    fn mode_participates_in_identity() {
        let bus = Stop::new("Bellville", -33.9, 18.6, Mode::GoldenArrow).unwrap();
        let train = Stop::new("Bellville", -33.9, 18.6, Mode::Train).unwrap();
        assert_ne!(bus, train);
    }

    #[test]
    fn hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(stop("Civic Centre"));
        assert!(set.contains(&stop("civic centre")));
        assert!(!set.contains(&stop("Adderley")));
    }

    #[test]
    fn blank_optional_fields_ignored() {
        let s = stop("A").with_code(" ").with_address("").with_routes(["T01", " ", "T02"]);
        assert_eq!(s.code(), None);
        assert_eq!(s.address(), None);
        assert_eq!(s.route_codes(), ["T01".to_string(), "T02".to_string()]);
    }

    #[test]
    fn distance_between_known_points() {
        // Cape Town station to Bellville station, roughly 18 km apart.
        let cpt = Stop::new("Cape Town", -33.9221, 18.4255, Mode::Train).unwrap();
        let bel = Stop::new("Bellville", -33.9046, 18.6297, Mode::Train).unwrap();
        let d = cpt.distance_km_to(&bel);
        assert!((18.0..20.0).contains(&d), "distance was {d}");
        assert!((bel.distance_km_to(&cpt) - d).abs() < 1e-9);
        assert_eq!(cpt.distance_km_to(&cpt), 0.0);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", stop("A")), "Stop(A, myciti)");
        assert_eq!(format!("{:?}", stop("A").with_code("X1")), "Stop(A [X1], myciti)");
    }
}
