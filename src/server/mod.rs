//! The `/api/*` proxy: geocoding, timezone and sunrise/sunset lookups
//! forwarded to the upstream services, plus the translation catalog.

mod handlers;
pub mod i18n;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/timezone", get(handlers::timezone))
        .route("/api/sunrise-sunset", get(handlers::sunrise_sunset))
        .route("/api/language", get(handlers::language))
        .route("/api/supportedlanguage", get(handlers::supported_languages))
        .fallback(handlers::not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start(config: &Config) -> std::io::Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let i18n = state.catalog.dir().display().to_string();
    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, %i18n, "geotime proxy listening");
    if config.upstream.locationiq_key.is_none() {
        tracing::warn!("LOCATIONIQ_KEY is not set; geocoding requests will be rejected upstream");
    }
    if config.upstream.geonames_user.is_none() {
        tracing::warn!("GEONAMES_USER is not set; timezone requests will be rejected upstream");
    }

    axum::serve(listener, app).await
}
