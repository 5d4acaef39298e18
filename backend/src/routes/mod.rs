use std::sync::Arc;

use axum::{http::StatusCode, Json};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{models::ServiceStatus, state::AppState};

pub mod auction;
pub mod ws;

pub fn router() -> OpenApiRouter<Arc<AppState>> {
    OpenApiRouter::new()
        .routes(routes!(root))
        .routes(routes!(health_check))
}

/// Service banner.
#[utoipa::path(
    get,
    path = "/v1/",
    tag = "Service",
    responses(
        (status = OK, description = "Service is running", body = ServiceStatus),
    ),
)]
async fn root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        message: "Auction server is running.".to_string(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Service",
    responses(
        (status = OK, description = "Healthy", body = String),
    ),
)]
async fn health_check() -> (StatusCode, String) {
    (StatusCode::OK, "Healthy!".to_string())
}
