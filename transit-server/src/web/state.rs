//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheConfig, JourneyCache};
use crate::metrics::Metrics;
use crate::planner::SharedPlanner;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Reloadable journey planner
    pub planner: SharedPlanner,

    /// Cached journey answers, cleared on reload
    pub cache: Arc<JourneyCache>,

    /// Load and query counters
    pub metrics: Arc<Metrics>,

    /// Deadline for a single journey query
    pub query_timeout: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        planner: SharedPlanner,
        cache: &CacheConfig,
        metrics: Arc<Metrics>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            planner,
            cache: Arc::new(JourneyCache::new(cache)),
            metrics,
            query_timeout,
        }
    }
}
