use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::location::providers::{DaylightReply, GeocodeReply, TimezoneReply};
use crate::location::{Backend, Coordinate, DirectBackend, LanguageEntry, ResolveError};

use super::i18n::CatalogError;
use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Broken { .. } => {
                tracing::error!(error = %e, "language catalog");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Language file is unreadable.")
            }
            other => api_error(StatusCode::BAD_REQUEST, other.to_string()),
        }
    }
}

pub async fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Not Found")
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Run a blocking upstream call off the async executor.
async fn call_upstream<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&DirectBackend) -> Result<T, ResolveError> + Send + 'static,
{
    let backend = state.upstream.clone();
    tokio::task::spawn_blocking(move || call(&backend))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::warn!(error = %e, "upstream call failed");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("{} is required field.", name)))
}

fn parse_coordinate(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinate, ApiError> {
    let lat: f64 = required(lat, "latitude")?
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "latitude is invalid."))?;
    let lng: f64 = required(lng, "longitude")?
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "longitude is invalid."))?;

    let at = Coordinate::new(lat, lng);
    if !at.is_valid() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lng: -180..180",
        ));
    }
    Ok(at)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ─── GET /api/geocode ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodeReply>, ApiError> {
    let start = Instant::now();
    let address = required(params.address.as_deref(), "address")?.to_string();

    let query = address.clone();
    let reply = call_upstream(&state, move |b| b.geocode(&query)).await?;

    tracing::info!(
        %address,
        results = reply.results.len(),
        elapsed_ms = elapsed_ms(start),
        "GET /api/geocode"
    );
    Ok(Json(reply))
}

// ─── GET /api/timezone ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

pub async fn timezone(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordinateQuery>,
) -> Result<Json<TimezoneReply>, ApiError> {
    let start = Instant::now();
    let at = parse_coordinate(params.lat.as_deref(), params.lng.as_deref())?;

    let reply = call_upstream(&state, move |b| b.timezone(at)).await?;

    tracing::info!(
        %at,
        zone = reply.results.as_ref().and_then(|r| r.timezone_id.as_deref()).unwrap_or("-"),
        elapsed_ms = elapsed_ms(start),
        "GET /api/timezone"
    );
    Ok(Json(reply))
}

// ─── GET /api/sunrise-sunset ─────────────────────────────────────

#[derive(Deserialize)]
pub struct DaylightQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub date: Option<String>,
}

pub async fn sunrise_sunset(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaylightQuery>,
) -> Result<Json<DaylightReply>, ApiError> {
    let start = Instant::now();
    let at = parse_coordinate(params.lat.as_deref(), params.lng.as_deref())?;

    // The upstream's own default is today in UTC.
    let date = match params.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, "date is invalid."))?,
        None => Utc::now().date_naive(),
    };

    let reply = call_upstream(&state, move |b| b.sunrise_sunset(at, date)).await?;

    tracing::info!(
        %at,
        %date,
        status = %reply.status,
        elapsed_ms = elapsed_ms(start),
        "GET /api/sunrise-sunset"
    );
    Ok(Json(reply))
}

// ─── GET /api/language ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

pub async fn language(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LanguageQuery>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let lang = params
        .lang
        .as_deref()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Language is missing."))?;

    let map = state.catalog.translations(lang)?;
    tracing::info!(lang, keys = map.len(), "GET /api/language");
    Ok(Json(map))
}

// ─── GET /api/supportedlanguage ──────────────────────────────────

pub async fn supported_languages(State(state): State<Arc<AppState>>) -> Result<Json<Vec<LanguageEntry>>, ApiError> {
    Ok(Json(state.catalog.supported()?))
}
