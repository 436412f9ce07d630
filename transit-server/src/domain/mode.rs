//! Travel modes and the route-label capability.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel mode: {0:?}")]
pub struct InvalidMode(String);

/// How a leg is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Train,
    #[serde(rename = "myciti")]
    MyCiti,
    GoldenArrow,
    Taxi,
    Walking,
}

impl Mode {
    /// Modes that are loaded from schedule data, one network each.
    pub const LOADED: [Mode; 4] = [Mode::Train, Mode::MyCiti, Mode::GoldenArrow, Mode::Taxi];

    /// Returns the lower-case identifier, also used as the data directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Train => "train",
            Mode::MyCiti => "myciti",
            Mode::GoldenArrow => "golden_arrow",
            Mode::Taxi => "taxi",
            Mode::Walking => "walking",
        }
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "train" => Ok(Mode::Train),
            "myciti" | "my_citi" => Ok(Mode::MyCiti),
            "golden_arrow" | "goldenarrow" => Ok(Mode::GoldenArrow),
            "taxi" => Ok(Mode::Taxi),
            "walking" | "walk" => Ok(Mode::Walking),
            _ => Err(InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can describe the service it runs as.
///
/// Transfer counting and presentation only need the mode and an optional
/// route label, so they work through this trait rather than concrete types.
pub trait RouteLabel {
    fn mode(&self) -> Mode;

    /// Route or line name, if the schedule provides one.
    fn route_label(&self) -> Option<&str>;
}

impl<T: RouteLabel + ?Sized> RouteLabel for Arc<T> {
    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn route_label(&self) -> Option<&str> {
        (**self).route_label()
    }
}
