//! API Routes
//!
//! - `/api/summarize` - Multipart upload, returns a summary
//! - `/api/health` - Health checks

pub mod health;
pub mod summarize;

use axum::{middleware::from_fn, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{cors_layer, preflight_no_content};
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(summarize::router(state.clone()))
        .merge(health::router(state))
        .layer(cors)
        .layer(from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
}
