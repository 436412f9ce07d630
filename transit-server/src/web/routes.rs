//! HTTP route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::cache::{JourneyKey, StopKey};
use crate::metrics::{Observer, QueryOutcome};
use crate::planner::{Algorithm, PlanError, PlanRequest, Scope};

use super::dto::*;
use super::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops/search", get(search_stops))
        .route("/stops/nearest", get(nearest_stops))
        .route("/journey/plan", get(plan_journey))
        .route("/metrics", get(metrics))
        .route("/admin/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name or code.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchQuery>,
) -> Result<Json<StopsResponse>, AppError> {
    let scope = parse_scope(req.scope.as_deref())?;
    let limit = clamp_limit(req.limit);
    let planner = state.planner.current().await;

    let stops = planner
        .catalog(scope)
        .search(&req.q, limit)
        .into_iter()
        .map(|stop| StopDto::from_stop(stop))
        .collect();

    Ok(Json(StopsResponse { stops }))
}

/// Stops closest to a coordinate.
async fn nearest_stops(
    State(state): State<AppState>,
    Query(req): Query<NearestQuery>,
) -> Result<Json<StopsResponse>, AppError> {
    if !(-90.0..=90.0).contains(&req.lat) || !(-180.0..=180.0).contains(&req.lon) {
        return Err(AppError::BadRequest {
            message: format!("Invalid coordinate: {}, {}", req.lat, req.lon),
        });
    }
    let scope = parse_scope(req.scope.as_deref())?;
    let limit = clamp_limit(req.limit);
    let planner = state.planner.current().await;

    let stops = planner
        .catalog(scope)
        .nearest_n(req.lat, req.lon, limit)
        .into_iter()
        .map(|(stop, km)| StopDto::from_stop(stop).with_distance(km))
        .collect();

    Ok(Json(StopsResponse { stops }))
}

/// Plan the earliest-arriving journey between two stops.
async fn plan_journey(
    State(state): State<AppState>,
    Query(req): Query<PlanQuery>,
) -> Result<Json<JourneyDto>, AppError> {
    let started = Instant::now();
    let reject = |e: PlanError| {
        state.metrics.query_completed(e.outcome(), started.elapsed());
        AppError::from(e)
    };

    let request = PlanRequest::parse(&req.from, &req.to, &req.time, req.day.as_deref()).map_err(reject)?;
    let scope = parse_scope(req.scope.as_deref())?;
    let algorithm = match req.algorithm.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Algorithm>().map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?),
    };

    let (generation, planner) = state.planner.snapshot().await;
    let algorithm = algorithm.unwrap_or(planner.config().algorithm);
    let max_rounds = req.rounds.unwrap_or(planner.config().max_rounds);
    let request = request
        .with_scope(scope)
        .with_algorithm(algorithm)
        .with_max_rounds(max_rounds);

    // Answers from a planner replaced by a reload land under an older
    // generation and are never read again.
    let key = JourneyKey {
        generation,
        scope,
        algorithm,
        source: StopKey::from(&**planner.resolve(scope, &request.from).map_err(reject)?),
        target: StopKey::from(&**planner.resolve(scope, &request.to).map_err(reject)?),
        departure_minutes: request.departure.minutes(),
        day_type: request.day_type,
        max_rounds,
    };

    if let Some(entry) = state.cache.get(&key).await {
        debug!(from = %request.from, to = %request.to, "journey cache hit");
        return match entry {
            Some(journey) => {
                state.metrics.query_completed(QueryOutcome::Found, started.elapsed());
                Ok(Json(JourneyDto::from_journey(&journey)))
            }
            None => Err(reject(PlanError::NoJourney {
                from: request.from,
                to: request.to,
            })),
        };
    }

    // The planner reports its own outcome once the search finishes.
    let search = tokio::task::spawn_blocking({
        let planner = Arc::clone(&planner);
        let request = request.clone();
        move || planner.plan(&request)
    });
    let result = match tokio::time::timeout(state.query_timeout, search).await {
        Ok(joined) => joined.map_err(|e| AppError::Internal {
            message: format!("Journey search failed: {e}"),
        })?,
        Err(_) => {
            warn!(
                from = %request.from,
                to = %request.to,
                timeout_ms = state.query_timeout.as_millis() as u64,
                "journey search timed out"
            );
            return Err(reject(PlanError::Timeout));
        }
    };

    match result {
        Ok(journey) => {
            let journey = Arc::new(journey);
            state.cache.insert(key, Some(journey.clone())).await;
            Ok(Json(JourneyDto::from_journey(&journey)))
        }
        Err(e @ PlanError::NoJourney { .. }) => {
            state.cache.insert(key, None).await;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load and query counters.
async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    state.cache.run_pending_tasks().await;
    Json(MetricsResponse {
        metrics: state.metrics.snapshot(),
        cached_journeys: state.cache.entry_count(),
    })
}

/// Rebuild the planner from disk.
async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let stops = state.planner.reload().await.map_err(|e| AppError::Internal {
        message: format!("Reload failed: {e}"),
    })?;
    state.cache.invalidate_all();
    info!(stops, "planner reloaded");

    Ok(Json(ReloadResponse {
        status: "reloaded",
        stops,
    }))
}

fn parse_scope(raw: Option<&str>) -> Result<Scope, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Scope::default()),
        Some(raw) => raw.parse().map_err(|e: crate::planner::InvalidScope| AppError::BadRequest {
            message: e.to_string(),
        }),
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    InvalidTime { message: String },
    StopNotFound { message: String },
    NoJourney { message: String },
    Timeout,
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::InvalidTime { .. } => StatusCode::BAD_REQUEST,
            AppError::StopNotFound { .. } | AppError::NoJourney { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "bad_request",
            AppError::InvalidTime { .. } => "invalid_time",
            AppError::StopNotFound { .. } => "stop_not_found",
            AppError::NoJourney { .. } => "no_journey",
            AppError::Timeout => "timeout",
            AppError::Internal { .. } => "internal",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest { message }
            | AppError::InvalidTime { message }
            | AppError::StopNotFound { message }
            | AppError::NoJourney { message }
            | AppError::Internal { message } => message.clone(),
            AppError::Timeout => "Journey search timed out".to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            PlanError::UnknownStop(_) => AppError::StopNotFound { message },
            PlanError::NoJourney { .. } => AppError::NoJourney { message },
            PlanError::InvalidTime(_) | PlanError::InvalidDayType(_) => AppError::InvalidTime { message },
            PlanError::Timeout => AppError::Timeout,
            PlanError::Journey(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            debug!(%status, "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            kind: self.kind(),
        });
        (status, body).into_response()
    }
}
