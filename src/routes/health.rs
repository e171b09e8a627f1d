use axum::{extract::State, response::Json as ResponseJson, routing::get, Json, Router};
use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        summarizer_configured: !state.config.llm.google_api_key.trim().is_empty(),
        converter_configured: !state.config.conversion.cloudconvert_api_key.trim().is_empty(),
    };

    Json(response)
}
