//! Caching layer for journey queries.
//!
//! Journey answers only change when the schedule data is reloaded, so they
//! are cached by everything that determines them, including the planner
//! generation they were computed on. Negative answers are cached too: an
//! unreachable destination stays unreachable until the next reload.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{DayType, Journey, Stop};
use crate::planner::{Algorithm, Scope};

/// Everything that determines a journey answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JourneyKey {
    /// Planner generation the answer was computed on.
    pub generation: u64,
    pub scope: Scope,
    pub algorithm: Algorithm,
    pub source: StopKey,
    pub target: StopKey,
    pub departure_minutes: u32,
    pub day_type: DayType,
    pub max_rounds: usize,
}

/// Normalized stop identity, so that differently spelled queries share an
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopKey {
    name: String,
    code: Option<String>,
}

impl From<&Stop> for StopKey {
    fn from(stop: &Stop) -> Self {
        Self {
            name: format!("{}:{}", stop.mode(), stop.name_key()),
            code: stop.code_key().map(str::to_string),
        }
    }
}

/// Cached journey, or `None` if no journey exists.
pub type JourneyEntry = Option<Arc<Journey>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Cache for planned journeys.
pub struct JourneyCache {
    journeys: MokaCache<JourneyKey, JourneyEntry>,
}

impl JourneyCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let journeys = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { journeys }
    }

    /// Get a cached answer. The outer `None` means a miss.
    pub async fn get(&self, key: &JourneyKey) -> Option<JourneyEntry> {
        self.journeys.get(key).await
    }

    pub async fn insert(&self, key: JourneyKey, entry: JourneyEntry) {
        self.journeys.insert(key, entry).await;
    }

    /// Get cache statistics (for monitoring).
    ///
    /// The count lags behind recent writes until
    /// [`run_pending_tasks`](Self::run_pending_tasks) runs.
    pub fn entry_count(&self) -> u64 {
        self.journeys.entry_count()
    }

    pub async fn run_pending_tasks(&self) {
        self.journeys.run_pending_tasks().await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.journeys.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, Mode, TransferPolicy, Trip};

    fn stop(name: &str) -> Arc<Stop> {
        Arc::new(Stop::new(name, -33.9, 18.4, Mode::Train).unwrap())
    }

    fn journey() -> Arc<Journey> {
        let (a, b) = (stop("Cape Town"), stop("Bellville"));
        let dep = ClockTime::from_hm(8, 0).unwrap();
        let leg = Arc::new(Trip::scheduled(a.clone(), b.clone(), dep, 25, DayType::Weekday, Mode::Train).unwrap());
        Arc::new(Journey::new(a, b, &[leg], dep, 25, TransferPolicy::LegCount).unwrap())
    }

    fn key(from: &str, to: &str, minutes: u32) -> JourneyKey {
        JourneyKey {
            generation: 0,
            scope: Scope::Train,
            algorithm: Algorithm::RoundBased,
            source: StopKey::from(&*stop(from)),
            target: StopKey::from(&*stop(to)),
            departure_minutes: minutes,
            day_type: DayType::Weekday,
            max_rounds: 6,
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }

    #[test]
    fn keys_ignore_spelling() {
        assert_eq!(key("Cape Town", "Bellville", 480), key("CAPE  town", "bellville", 480));
        assert_ne!(key("Cape Town", "Bellville", 480), key("Cape Town", "Bellville", 481));
        assert_ne!(key("Cape Town", "Bellville", 480), key("Bellville", "Cape Town", 480));

        let reloaded = JourneyKey {
            generation: 1,
            ..key("Cape Town", "Bellville", 480)
        };
        assert_ne!(key("Cape Town", "Bellville", 480), reloaded);
    }

    #[tokio::test]
    async fn caches_found_and_missing_journeys() {
        let cache = JourneyCache::new(&CacheConfig::default());
        let found = key("Cape Town", "Bellville", 480);
        let missing = key("Bellville", "Cape Town", 480);

        assert!(cache.get(&found).await.is_none());

        cache.insert(found.clone(), Some(journey())).await;
        cache.insert(missing.clone(), None).await;

        let hit = cache.get(&found).await.unwrap().unwrap();
        assert_eq!(hit.duration_mins(), 25);
        assert!(matches!(cache.get(&missing).await, Some(None)));

        cache.invalidate_all();
        assert!(cache.get(&found).await.is_none());
    }
}
