//! Routing scopes: the mode sets a router pair is built over.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Mode, TransferPolicy};

/// A set of modes that can be planned over together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Train,
    #[serde(rename = "myciti")]
    MyCiti,
    GoldenArrow,
    Taxi,
    /// Both bus operators.
    Bus,
    /// Every loaded mode, linked by walking.
    #[default]
    All,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Train,
        Scope::MyCiti,
        Scope::GoldenArrow,
        Scope::Taxi,
        Scope::Bus,
        Scope::All,
    ];

    /// The modes requested for this scope. Multimodal scopes also get
    /// walking when the combined network selects them.
    pub fn modes(&self) -> &'static [Mode] {
        match self {
            Scope::Train => &[Mode::Train],
            Scope::MyCiti => &[Mode::MyCiti],
            Scope::GoldenArrow => &[Mode::GoldenArrow],
            Scope::Taxi => &[Mode::Taxi],
            Scope::Bus => &[Mode::MyCiti, Mode::GoldenArrow],
            Scope::All => &Mode::LOADED,
        }
    }

    pub fn is_multimodal(&self) -> bool {
        self.modes().len() > 1
    }

    /// How transfers are counted for journeys in this scope.
    pub fn transfer_policy(&self) -> TransferPolicy {
        if self.is_multimodal() {
            TransferPolicy::ModeOrRouteChange
        } else {
            TransferPolicy::LegCount
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Train => "train",
            Scope::MyCiti => "myciti",
            Scope::GoldenArrow => "golden_arrow",
            Scope::Taxi => "taxi",
            Scope::Bus => "bus",
            Scope::All => "all",
        }
    }
}

/// Error returned when parsing an unknown scope name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope: {0:?}")]
pub struct InvalidScope(String);

impl FromStr for Scope {
    type Err = InvalidScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Some(scope) = Scope::ALL.into_iter().find(|scope| scope.as_str() == normalized) {
            return Ok(scope);
        }
        // Single-mode scopes accept the same aliases as their mode.
        match normalized.parse::<Mode>() {
            Ok(Mode::Train) => Ok(Scope::Train),
            Ok(Mode::MyCiti) => Ok(Scope::MyCiti),
            Ok(Mode::GoldenArrow) => Ok(Scope::GoldenArrow),
            Ok(Mode::Taxi) => Ok(Scope::Taxi),
            _ => Err(InvalidScope(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
