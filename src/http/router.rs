//! Router configuration for the HTTP API.

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::utils::error::{RegistryError, Result};

/// Builds the router. Fails when `static_dir` does not exist.
pub fn create_router(state: AppState, static_dir: &str) -> Result<Router> {
    if !Path::new(static_dir).is_dir() {
        return Err(RegistryError::ConfigError {
            message: format!("Static directory not found: {}", static_dir),
        });
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/hospital_cards", get(handlers::hospital_cards))
        .route("/hospital-cards", get(handlers::indexed_hospital_cards))
        .route("/hospital-info", get(handlers::hospital_info))
        .route("/hospital-data", get(handlers::hospital_data))
        .route("/add-hospital", post(handlers::add_hospital))
        .route("/blocked-prefectures", get(handlers::get_blocked_prefectures))
        .route("/block-prefecture", post(handlers::block_prefecture))
        .route("/unblock-prefecture", post(handlers::unblock_prefecture))
        .route("/set-blocked-prefectures", post(handlers::set_blocked_prefectures))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(router)
}
