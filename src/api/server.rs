//! HTTP query API over an ingested weather database.
//!
//! Two read-only endpoints: a paginated raw observation listing and yearly
//! statistics recomputed from the raw table at request time.

use crate::error::{Result, WeatherError};
use crate::models::{Observation, YearlySummary};
use crate::store::{Database, ObservationFilter, StatsFilter};
use crate::utils::constants::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::signal::unix::{self, SignalKind};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared state for HTTP handlers. The service itself is stateless; the mutex
/// serializes access to the single SQLite connection.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

/// Query params for the raw observation listing
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub date: Option<String>,
    pub station_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Query params for the yearly statistics endpoint; `date` matches the
/// derived year string
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
    pub station_id: Option<String>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// JSON response for the raw observation listing
#[derive(Debug, Serialize)]
pub struct WeatherListResponse {
    pub weather_data: Vec<Observation>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// JSON response for the yearly statistics endpoint
#[derive(Debug, Serialize)]
pub struct WeatherStatsResponse {
    pub weather_stats: Vec<YearlySummary>,
}

/// Store failures surface as a 500 with a plain JSON error body
struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// GET /api/weather - paginated raw observations
async fn list_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> std::result::Result<Json<WeatherListResponse>, ApiError> {
    let filter = ObservationFilter {
        date: query.date,
        station_id: query.station_id,
    };

    // Lenient pagination: values below 1 fall back to the first page rather
    // than erroring, and a page past the end returns an empty list
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);

    debug!(?filter, page, per_page, "listing observations");

    let db = lock_db(&state)?;
    let result = db.observations(&filter, page, per_page)?;

    Ok(Json(WeatherListResponse {
        weather_data: result.observations,
        page: result.page,
        per_page: result.per_page,
        total_pages: result.total_pages,
        total_items: result.total_items,
    }))
}

/// GET /api/weather/stats - yearly statistics computed from the raw table
async fn weather_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> std::result::Result<Json<WeatherStatsResponse>, ApiError> {
    let filter = StatsFilter {
        year: query.date,
        station_id: query.station_id,
    };

    debug!(?filter, "computing yearly stats");

    let db = lock_db(&state)?;
    let weather_stats = db.yearly_stats(&filter)?;

    Ok(Json(WeatherStatsResponse { weather_stats }))
}

fn lock_db(state: &AppState) -> std::result::Result<std::sync::MutexGuard<'_, Database>, ApiError> {
    state
        .db
        .lock()
        .map_err(|_| ApiError(WeatherError::Server("database lock poisoned".to_string())))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather", get(list_weather))
        .route("/api/weather/stats", get(weather_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the query API until SIGTERM or SIGINT
pub async fn serve(db: Database, bind: SocketAddr) -> Result<()> {
    let app = router(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(address = %bind, "weather API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    tracing::info!("weather API shut down");
    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
