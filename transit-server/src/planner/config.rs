//! Planner configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::network::WalkingConfig;

/// Which earliest-arrival router answers a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Round-based search; the round limit bounds the number of legs.
    #[default]
    RoundBased,

    /// Single pass over all connections in departure order.
    ConnectionScan,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::RoundBased => "round_based",
            Algorithm::ConnectionScan => "connection_scan",
        }
    }
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm: {0:?}")]
pub struct InvalidAlgorithm(String);

impl FromStr for Algorithm {
    type Err = InvalidAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round_based" | "raptor" => Ok(Algorithm::RoundBased),
            "connection_scan" | "csa" => Ok(Algorithm::ConnectionScan),
            _ => Err(InvalidAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration parameters for journey planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Round limit used when a query gives none.
    pub max_rounds: usize,

    /// Router used when a query names none.
    pub algorithm: Algorithm,

    /// Walking transfers for the multimodal scopes, or `None` to disable
    /// them.
    pub walking: Option<WalkingConfig>,
}

impl PlannerConfig {
    pub fn new(max_rounds: usize, algorithm: Algorithm, walking: Option<WalkingConfig>) -> Self {
        Self {
            max_rounds,
            algorithm,
            walking,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 6,
            algorithm: Algorithm::RoundBased,
            walking: Some(WalkingConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.max_rounds, 6);
        assert_eq!(config.algorithm, Algorithm::RoundBased);
        assert_eq!(config.walking, Some(WalkingConfig::default()));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(3, Algorithm::ConnectionScan, None);

        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.algorithm, Algorithm::ConnectionScan);
        assert!(config.walking.is_none());
    }

    #[test]
    fn algorithm_names() {
        assert_eq!("round_based".parse::<Algorithm>().unwrap(), Algorithm::RoundBased);
        assert_eq!("CSA".parse::<Algorithm>().unwrap(), Algorithm::ConnectionScan);
        assert_eq!(Algorithm::ConnectionScan.to_string(), "connection_scan");
        assert!("dijkstra".parse::<Algorithm>().is_err());
    }
}
