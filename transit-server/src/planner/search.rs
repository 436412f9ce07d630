//! Journey queries over the loaded networks.
//!
//! A [`JourneyPlanner`] is built once from the per-mode networks: it unions
//! them into the combined network, then builds one router pair per
//! [`Scope`]. Queries resolve stop names against the scope's stops, run the
//! requested router and assemble the [`Journey`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::{
    ClockTime, DayType, DomainError, InvalidDayType, Journey, Mode, Stop, TimeError, Trip,
};
use crate::ingest::{self, IngestError};
use crate::metrics::{Observer, QueryOutcome};
use crate::network::{CombinedGraph, NetworkGraph, StopCatalog};
use crate::router::{BuildStats, ConnectionScanRouter, RoundBasedRouter, RouteResult};

use super::config::{Algorithm, PlannerConfig};
use super::scope::Scope;

/// Error from journey planning.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    /// A stop name matched nothing in the scope
    #[error("no stop matches {0:?}")]
    UnknownStop(String),

    /// The destination cannot be reached
    #[error("no journey from {from} to {to}")]
    NoJourney { from: String, to: String },

    /// The departure time could not be parsed
    #[error(transparent)]
    InvalidTime(#[from] TimeError),

    /// The day type could not be parsed
    #[error(transparent)]
    InvalidDayType(#[from] InvalidDayType),

    /// The query took too long
    #[error("journey search timed out")]
    Timeout,

    /// The router returned legs that do not form a journey
    #[error("invalid journey: {0}")]
    Journey(#[from] DomainError),
}

impl PlanError {
    /// The observer outcome for this error.
    pub fn outcome(&self) -> QueryOutcome {
        match self {
            PlanError::UnknownStop(_) => QueryOutcome::UnknownStop,
            PlanError::NoJourney { .. } | PlanError::Journey(_) => QueryOutcome::NotFound,
            PlanError::InvalidTime(_) | PlanError::InvalidDayType(_) => QueryOutcome::InvalidTime,
            PlanError::Timeout => QueryOutcome::Timeout,
        }
    }
}

/// A journey query.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub from: String,
    pub to: String,
    pub departure: ClockTime,
    pub day_type: DayType,
    pub scope: Scope,
    /// Router to use; the planner's default when `None`.
    pub algorithm: Option<Algorithm>,
    /// Round limit; the planner's default when `None`.
    pub max_rounds: Option<usize>,
}

impl PlanRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, departure: ClockTime, day_type: DayType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            departure,
            day_type,
            scope: Scope::default(),
            algorithm: None,
            max_rounds: None,
        }
    }

    /// Build a request from wire strings.
    ///
    /// The time is `HH:MM` (or `H:MM`, `HH.MM`). The day type is matched
    /// loosely ("Monday to Friday" is a weekday) and defaults to weekday
    /// when absent.
    pub fn parse(from: &str, to: &str, time: &str, day: Option<&str>) -> Result<Self, PlanError> {
        let departure = ClockTime::parse_hhmm(time)?;
        let day_type = match day.map(str::trim) {
            None | Some("") => DayType::Weekday,
            Some(raw) => DayType::normalize(raw)?,
        };
        Ok(Self::new(from.trim(), to.trim(), departure, day_type))
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }
}

/// The routers and stops for one scope.
struct ScopeRouters {
    catalog: StopCatalog,
    round_based: RoundBasedRouter<Arc<Trip>>,
    connection_scan: ConnectionScanRouter<Arc<Trip>>,
}

impl ScopeRouters {
    fn route(
        &self,
        algorithm: Algorithm,
        source: &Arc<Stop>,
        target: &Arc<Stop>,
        request: &PlanRequest,
        max_rounds: usize,
    ) -> Option<RouteResult<Arc<Trip>>> {
        match algorithm {
            Algorithm::RoundBased => {
                self.round_based
                    .route(source, target, request.departure, max_rounds, request.day_type)
            }
            Algorithm::ConnectionScan => {
                self.connection_scan
                    .scan(source, target, request.departure, request.day_type)
            }
        }
    }
}

/// Plans journeys over every loaded mode.
///
/// Immutable once built and safe to share between threads; reloading
/// builds a new planner.
pub struct JourneyPlanner {
    graphs: Vec<NetworkGraph>,
    combined: CombinedGraph,
    scopes: HashMap<Scope, ScopeRouters>,
    config: PlannerConfig,
    observer: Arc<dyn Observer>,
}

impl JourneyPlanner {
    /// Build the combined network and a router pair for every scope.
    pub fn build(graphs: Vec<NetworkGraph>, config: PlannerConfig, observer: Arc<dyn Observer>) -> Self {
        let started = Instant::now();
        let combined = CombinedGraph::build(&graphs, config.walking.as_ref());

        let scopes = Scope::ALL
            .into_iter()
            .map(|scope| {
                let selection = combined.select(scope.modes());
                let round_based = RoundBasedRouter::new(&selection.stops, selection.trips.iter().cloned());
                let connection_scan =
                    ConnectionScanRouter::new(&selection.stops, selection.trips.iter().cloned());
                let stats = round_based.stats();
                debug!(
                    scope = %scope,
                    stops = stats.stops,
                    connections = stats.connections,
                    footpaths = stats.footpaths,
                    orphans = stats.orphans,
                    "built routers"
                );
                let routers = ScopeRouters {
                    catalog: StopCatalog::new(selection.stops),
                    round_based,
                    connection_scan,
                };
                (scope, routers)
            })
            .collect();

        info!(
            scopes = Scope::ALL.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "journey planner ready"
        );

        Self {
            graphs,
            combined,
            scopes,
            config,
            observer,
        }
    }

    /// Load every mode from `data_dir` and build a planner over them.
    pub fn load(data_dir: &Path, config: PlannerConfig, observer: Arc<dyn Observer>) -> Result<Self, IngestError> {
        let graphs = ingest::load_all(data_dir, observer.as_ref())?;
        Ok(Self::build(graphs, config, observer))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The network for one loaded mode.
    pub fn graph(&self, mode: Mode) -> Option<&NetworkGraph> {
        self.graphs.iter().find(|g| g.mode() == mode)
    }

    pub fn combined(&self) -> &CombinedGraph {
        &self.combined
    }

    /// Every scope has routers from construction on.
    fn routers(&self, scope: Scope) -> &ScopeRouters {
        &self.scopes[&scope]
    }

    /// Stops that can be planned between in `scope`.
    pub fn catalog(&self, scope: Scope) -> &StopCatalog {
        &self.routers(scope).catalog
    }

    /// Router build statistics for `scope`.
    pub fn stats(&self, scope: Scope) -> BuildStats {
        self.routers(scope).round_based.stats()
    }

    /// Resolve a stop name within `scope`.
    pub fn resolve(&self, scope: Scope, label: &str) -> Result<&Arc<Stop>, PlanError> {
        self.catalog(scope)
            .resolve(label)
            .ok_or_else(|| PlanError::UnknownStop(label.to_string()))
    }

    /// Find the earliest-arriving journey for `request`.
    pub fn plan(&self, request: &PlanRequest) -> Result<Journey, PlanError> {
        let started = Instant::now();
        let result = self.plan_inner(request);

        let outcome = match &result {
            Ok(_) => QueryOutcome::Found,
            Err(e) => e.outcome(),
        };
        self.observer.query_completed(outcome, started.elapsed());
        result
    }

    fn plan_inner(&self, request: &PlanRequest) -> Result<Journey, PlanError> {
        let source = self.resolve(request.scope, &request.from)?;
        let target = self.resolve(request.scope, &request.to)?;
        let routers = self.routers(request.scope);

        let algorithm = request.algorithm.unwrap_or(self.config.algorithm);
        let max_rounds = request.max_rounds.unwrap_or(self.config.max_rounds);

        let route = routers
            .route(algorithm, source, target, request, max_rounds)
            .ok_or_else(|| PlanError::NoJourney {
                from: source.name().to_string(),
                to: target.name().to_string(),
            })?;

        debug!(
            from = source.name(),
            to = target.name(),
            scope = %request.scope,
            algorithm = %algorithm,
            legs = route.legs().len(),
            arrival = %route.arrival(),
            "journey found"
        );

        let journey = Journey::new(
            source.clone(),
            target.clone(),
            route.legs(),
            request.departure,
            route.elapsed_mins(),
            request.scope.transfer_policy(),
        )?;
        Ok(journey)
    }
}

impl std::fmt::Debug for JourneyPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JourneyPlanner")
            .field("graphs", &self.graphs)
            .field("combined", &self.combined)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
