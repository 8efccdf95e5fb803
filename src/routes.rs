use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    areas::{OfficeOption, RegionIndex},
    config::{Config, ForecastMode},
    database::Database,
    forecast::{jma::JmaError, types::ForecastEntry, ForecastError, ForecastService},
    render::render_text,
};

pub const DATA_FAILED_TO_LOAD: &str = "data failed to load";

// Shared application state. Nothing in here is mutated after start-up;
// every request carries its own selection in the path.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when the area file could not be loaded.
    pub regions: Option<Arc<RegionIndex>>,
    pub database: Arc<Database>,
    pub forecasts: Arc<ForecastService>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub areas_loaded: bool,
    pub forecast_mode: ForecastMode,
}

#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OfficesResponse {
    pub region: String,
    pub offices: Vec<OfficeOption>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub office_code: String,
    pub office_name: Option<String>,
    pub region: Option<String>,
    pub mode: ForecastMode,
    pub entries: Vec<ForecastEntry>,
    /// Rows held for this office after the fetch, duplicates included.
    pub stored_rows: i64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub office_code: String,
    pub office_name: Option<String>,
    pub entries: Vec<ForecastEntry>,
}

fn region_index(state: &AppState) -> Result<&RegionIndex, ApiError> {
    state
        .regions
        .as_deref()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, DATA_FAILED_TO_LOAD))
}

fn forecast_error(office_code: &str, err: ForecastError) -> ApiError {
    tracing::error!("Forecast for {} failed: {}", office_code, err);
    match err {
        ForecastError::Remote(remote @ JmaError::InvalidOfficeCode(_)) => {
            api_error(StatusCode::BAD_REQUEST, remote.user_message())
        }
        ForecastError::Remote(remote) => api_error(StatusCode::BAD_GATEWAY, remote.user_message()),
        ForecastError::Storage(_) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Error: storage unavailable")
        }
    }
}

async fn lookup_office_name(state: &AppState, office_code: &str) -> Option<String> {
    let stored = match state.database.office_name(office_code).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Office name lookup for {} failed: {}", office_code, e);
            None
        }
    };
    stored.or_else(|| {
        state
            .regions
            .as_deref()
            .and_then(|index| index.office_name(office_code))
            .map(str::to_string)
    })
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.database.health_check().await {
        Ok(()) if state.regions.is_some() => "healthy",
        Ok(()) => "degraded",
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        areas_loaded: state.regions.is_some(),
        forecast_mode: state.config.forecast_mode,
    })
}

pub async fn list_regions(State(state): State<AppState>) -> Result<Json<RegionsResponse>, ApiError> {
    let index = region_index(&state)?;
    Ok(Json(RegionsResponse {
        regions: index.regions(),
    }))
}

pub async fn list_offices(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<OfficesResponse>, ApiError> {
    let index = region_index(&state)?;
    match index.offices(&region) {
        Some(offices) => Ok(Json(OfficesResponse { region, offices })),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("unknown region: {}", region),
        )),
    }
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Path(office_code): Path<String>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let fetch = state
        .forecasts
        .get_forecast(&office_code)
        .await
        .map_err(|e| forecast_error(&office_code, e))?;
    let office_name = lookup_office_name(&state, &office_code).await;
    let region = state
        .regions
        .as_deref()
        .and_then(|index| index.region_of(&office_code))
        .map(str::to_string);

    Ok(Json(ForecastResponse {
        office_code,
        office_name,
        region,
        mode: state.forecasts.mode(),
        entries: fetch.entries,
        stored_rows: fetch.stored_rows,
        generated_at: chrono::Utc::now(),
    }))
}

pub async fn get_forecast_text(
    State(state): State<AppState>,
    Path(office_code): Path<String>,
) -> Result<String, ApiError> {
    let fetch = state
        .forecasts
        .get_forecast(&office_code)
        .await
        .map_err(|e| forecast_error(&office_code, e))?;
    Ok(render_text(&fetch.entries))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(office_code): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let entries = state
        .forecasts
        .history(&office_code)
        .await
        .map_err(|e| forecast_error(&office_code, e))?;
    let office_name = lookup_office_name(&state, &office_code).await;

    Ok(Json(HistoryResponse {
        office_code,
        office_name,
        entries,
    }))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/regions", get(list_regions))
        .route("/regions/:region/offices", get(list_offices))
        .route("/forecast/:office_code", get(get_forecast))
        .route("/forecast/:office_code/text", get(get_forecast_text))
        .route("/history/:office_code", get(get_history))
        .with_state(state)
}
