//! Reloadable planner handle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::ingest::IngestError;
use crate::metrics::Observer;

use super::config::PlannerConfig;
use super::search::JourneyPlanner;

/// Error from rebuilding the planner.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// Schedule data could not be read
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The build task panicked or was cancelled
    #[error("planner build failed: {0}")]
    Build(#[from] tokio::task::JoinError),
}

/// Thread-safe planner handle with support for reloading from disk.
///
/// Queries take a snapshot with [`current`](Self::current) and keep using
/// it even if a reload swaps in a new planner meanwhile. Every successful
/// reload bumps the generation, so answers derived from an older planner
/// can be told apart from current ones.
#[derive(Clone)]
pub struct SharedPlanner {
    inner: Arc<RwLock<Generation>>,
    data_dir: PathBuf,
    config: PlannerConfig,
    observer: Arc<dyn Observer>,
}

/// The planner serving queries and how many reloads produced it.
struct Generation {
    planner: Arc<JourneyPlanner>,
    number: u64,
}

impl Generation {
    fn first(planner: JourneyPlanner) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self {
            planner: Arc::new(planner),
            number: 0,
        }))
    }
}

impl SharedPlanner {
    /// Load the schedule data and build the first planner.
    pub async fn load(
        data_dir: impl Into<PathBuf>,
        config: PlannerConfig,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, ReloadError> {
        let data_dir = data_dir.into();
        let planner = build(data_dir.clone(), config.clone(), observer.clone()).await?;

        Ok(Self {
            inner: Generation::first(planner),
            data_dir,
            config,
            observer,
        })
    }

    /// Wrap an already built planner. Reloads read from `data_dir`.
    pub fn from_planner(
        planner: JourneyPlanner,
        data_dir: impl Into<PathBuf>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            config: planner.config().clone(),
            inner: Generation::first(planner),
            data_dir: data_dir.into(),
            observer,
        }
    }

    /// The planner currently serving queries.
    pub async fn current(&self) -> Arc<JourneyPlanner> {
        self.inner.read().await.planner.clone()
    }

    /// The current planner together with its generation.
    pub async fn snapshot(&self) -> (u64, Arc<JourneyPlanner>) {
        let guard = self.inner.read().await;
        (guard.number, guard.planner.clone())
    }

    /// Number of successful reloads so far.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.number
    }

    /// Rebuild the planner from disk and swap it in.
    ///
    /// On failure the current planner keeps serving and the error is
    /// returned. Returns the number of stops in the combined network.
    pub async fn reload(&self) -> Result<usize, ReloadError> {
        let planner = build(self.data_dir.clone(), self.config.clone(), self.observer.clone()).await?;
        let stops = planner.combined().stops().len();

        let mut guard = self.inner.write().await;
        guard.planner = Arc::new(planner);
        guard.number += 1;

        Ok(stops)
    }
}

/// Build a planner on the blocking pool.
async fn build(
    data_dir: PathBuf,
    config: PlannerConfig,
    observer: Arc<dyn Observer>,
) -> Result<JourneyPlanner, ReloadError> {
    let planner =
        tokio::task::spawn_blocking(move || JourneyPlanner::load(&data_dir, config, observer)).await??;
    Ok(planner)
}
