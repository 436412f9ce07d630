//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::network::WalkingConfig;
use crate::planner::PlannerConfig;

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root of the schedule data, one directory per mode.
    pub data_dir: PathBuf,

    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Deadline for a single journey query.
    pub query_timeout: Duration,

    pub planner: PlannerConfig,
}

impl ServerConfig {
    /// Read the configuration from `TRANSIT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = get("TRANSIT_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);

        let bind_addr = match get("TRANSIT_BIND_ADDR") {
            Some(value) => parse("TRANSIT_BIND_ADDR", value)?,
            None => defaults.bind_addr,
        };

        let max_rounds = match get("TRANSIT_MAX_ROUNDS") {
            Some(value) => parse("TRANSIT_MAX_ROUNDS", value)?,
            None => defaults.planner.max_rounds,
        };

        let query_timeout = match get("TRANSIT_QUERY_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(parse("TRANSIT_QUERY_TIMEOUT_MS", value)?),
            None => defaults.query_timeout,
        };

        let walking = match get("TRANSIT_WALKING").as_deref().map(str::to_ascii_lowercase) {
            None => defaults.planner.walking,
            Some(v) if matches!(v.as_str(), "on" | "true" | "1" | "yes") => Some(WalkingConfig::default()),
            Some(v) if matches!(v.as_str(), "off" | "false" | "0" | "no") => None,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    name: "TRANSIT_WALKING",
                    value: v,
                    reason: "expected on or off".to_string(),
                });
            }
        };

        Ok(Self {
            data_dir,
            bind_addr,
            query_timeout,
            planner: PlannerConfig::new(max_rounds, defaults.planner.algorithm, walking),
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            query_timeout: Duration::from_millis(2000),
            planner: PlannerConfig::default(),
        }
    }
}
