use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_server::cache::CacheConfig;
use transit_server::config::ServerConfig;
use transit_server::metrics::Metrics;
use transit_server::planner::SharedPlanner;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,transit_server=debug")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(data_dir = %config.data_dir.display(), "loading schedules");

    let metrics = Arc::new(Metrics::new());
    let planner = SharedPlanner::load(&config.data_dir, config.planner.clone(), metrics.clone()).await?;
    {
        let current = planner.current().await;
        info!(
            stops = current.combined().stops().len(),
            trips = current.combined().trips().len(),
            walking_links = current.combined().walking_links(),
            "schedules loaded"
        );
    }

    let state = AppState::new(planner, &CacheConfig::default(), metrics, config.query_timeout);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "transit journey planner listening");
    info!("GET  /health          - Health check");
    info!("GET  /stops/search    - Search stops by name");
    info!("GET  /stops/nearest   - Stops near a coordinate");
    info!("GET  /journey/plan    - Plan a journey");
    info!("GET  /metrics         - Load and query counters");
    info!("POST /admin/reload    - Reload schedules from disk");

    axum::serve(listener, app).await?;
    Ok(())
}
