//! Health check endpoint.

use actix_web::{HttpResponse, web};
use inkpress_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    tracing::debug!(storage = state.storage, "Health check");
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
